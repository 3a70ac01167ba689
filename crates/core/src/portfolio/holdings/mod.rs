//! Holdings module - weighted-average positions and their valuation.

mod holdings_calculator;
mod holdings_model;
mod holdings_valuation;

pub use holdings_calculator::HoldingsCalculator;
pub use holdings_model::*;
pub use holdings_valuation::value_positions;
pub(crate) use holdings_valuation::percent_of;
