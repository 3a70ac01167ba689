use thiserror::Error;

/// Failures of the external price feed.
///
/// These are engine-level failures: a recomputation that hits one publishes
/// nothing and the previous snapshot stays current.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// The feed could not be reached or refused the request.
    #[error("Price feed unavailable: {0}")]
    Unavailable(String),

    /// The feed did not answer in time.
    #[error("Price feed timed out: {0}")]
    Timeout(String),

    /// The feed rate limited the request.
    #[error("Price feed rate limited: {0}")]
    RateLimited(String),

    /// The feed answered with data that cannot be used.
    #[error("Invalid price feed response: {0}")]
    InvalidResponse(String),

    /// Every attempt failed; carries the last underlying error.
    #[error("Price feed failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl MarketDataError {
    /// Whether another attempt has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MarketDataError::Unavailable(_)
                | MarketDataError::Timeout(_)
                | MarketDataError::RateLimited(_)
        )
    }
}
