//! Ledgerfolio Core - ledger unification and portfolio valuation.
//!
//! Turns security transactions and cash flows into a per-account ledger with
//! running balances, weighted-average holdings, and reporting-currency
//! performance figures. Prices and exchange rates come from a caller-supplied
//! [`market_data::PriceFeedTrait`] implementation.

pub mod accounts;
pub mod activities;
pub mod constants;
pub mod errors;
pub mod fx;
pub mod ledger;
pub mod market_data;
pub mod portfolio;
pub mod settings;
pub mod utils;

pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
