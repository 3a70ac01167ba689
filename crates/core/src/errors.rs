//! Core error types for the ledger and valuation engine.
//!
//! Per-record problems (a malformed trade, a flow pointing at a deleted
//! account) never abort a recomputation. They are reported as
//! [`CalculationWarning`] values next to the results. Only failures of the
//! shared price feed surface as an [`Error`] from the orchestrating service.

use chrono::ParseError as ChronoParseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activities::ActivityError;
use crate::fx::FxError;
use crate::market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Activity error: {0}")]
    Activity(#[from] ActivityError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Portfolio calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    /// A newer recomputation published its snapshot first.
    #[error("Recomputation {generation} was superseded by {latest}")]
    Superseded { generation: u64, latest: u64 },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors that occur during portfolio calculations.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Decimal overflow while computing {0}")]
    Overflow(String),

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

/// Validation errors for configuration and caller input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

/// A per-record problem that was recovered from during a calculation pass.
///
/// The offending record is skipped (or the offending amount left out of a
/// total) and processing continues with the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationWarning {
    pub record_id: String,
    pub account_id: Option<String>,
    pub message: String,
}

impl CalculationWarning {
    pub fn new(record_id: impl Into<String>, account_id: Option<&str>, message: String) -> Self {
        Self {
            record_id: record_id.into(),
            account_id: account_id.map(str::to_string),
            message,
        }
    }
}

impl std::fmt::Display for CalculationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.account_id {
            Some(account_id) => write!(
                f,
                "Record {} (account {}): {}",
                self.record_id, account_id, self.message
            ),
            None => write!(f, "Record {}: {}", self.record_id, self.message),
        }
    }
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
