//! History module - yearly performance series.

mod history_model;
mod history_projector;

pub use history_model::{ValueSource, YearEndValuation, YearPerformance};
pub use history_projector::{HistoryInputs, TimeSeriesProjector};
