use async_trait::async_trait;

use super::market_data_errors::MarketDataError;
use super::market_data_model::PriceMap;
use crate::fx::RateTable;

/// The external collaborator that supplies live prices and exchange rates.
///
/// Implementations may return partial maps; callers treat a missing entry as
/// "retain the last known value".
#[async_trait]
pub trait PriceFeedTrait: Send + Sync {
    /// Fetches the latest quote for each requested ticker.
    async fn fetch_prices(&self, tickers: &[String]) -> Result<PriceMap, MarketDataError>;

    /// Fetches the current global exchange rates.
    async fn fetch_rates(&self) -> Result<RateTable, MarketDataError>;
}
