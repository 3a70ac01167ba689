use thiserror::Error;

/// Errors raised while resolving or applying exchange rates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),
    #[error("Invalid currency pair: {0}")]
    InvalidCurrencyPair(String),
    #[error("Converted amount out of range: {0}")]
    ConversionOverflow(String),
    #[error("Unknown market: {0}")]
    UnknownMarket(String),
}
