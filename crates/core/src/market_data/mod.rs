//! Market data module - the price feed collaborator interface and the
//! last-known market data it feeds.

mod market_data_errors;
mod market_data_model;
mod market_data_traits;

pub use market_data_errors::MarketDataError;
pub use market_data_model::{MarketSnapshot, PriceMap, PriceQuote};
pub use market_data_traits::PriceFeedTrait;
