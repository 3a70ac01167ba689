//! Price feed payloads and the last-known market data they are merged into.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::fx::RateTable;

/// Latest price of one ticker as reported by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price: Decimal,
    #[serde(default)]
    pub change: Option<Decimal>,
    #[serde(default)]
    pub change_percent: Option<Decimal>,
}

impl PriceQuote {
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            change: None,
            change_percent: None,
        }
    }
}

/// Ticker -> latest quote.
pub type PriceMap = HashMap<String, PriceQuote>;

/// Prices and rates accumulated across feed fetches.
///
/// Feeds may answer partially. Merging keeps every previously known value
/// the new answer does not mention, so a missing entry means "unchanged",
/// never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub prices: PriceMap,
    pub rates: RateTable,
}

impl MarketSnapshot {
    pub fn new(prices: PriceMap, rates: RateTable) -> Self {
        Self { prices, rates }
    }

    /// Returns a new snapshot with `prices` and `rates` laid over this one.
    ///
    /// Non-positive prices and rates are treated as missing.
    pub fn merged_with(&self, prices: PriceMap, rates: RateTable) -> Self {
        let mut merged = self.clone();
        for (ticker, quote) in prices {
            if quote.price > Decimal::ZERO {
                merged.prices.insert(ticker, quote);
            } else {
                log::warn!(
                    "Ignoring non-positive price {} for {}; keeping last known value",
                    quote.price,
                    ticker
                );
            }
        }
        for (pair, rate) in rates {
            if rate > Decimal::ZERO {
                merged.rates.insert(pair, rate);
            } else {
                log::warn!(
                    "Ignoring non-positive rate {} for {}; keeping last known value",
                    rate,
                    pair
                );
            }
        }
        merged
    }

    pub fn price_of(&self, ticker: &str) -> Option<&PriceQuote> {
        self.prices.get(ticker)
    }

    /// Price for one listing. A quote keyed by the market-qualified id
    /// (`"US:ABC"`) wins over one keyed by the bare ticker, which is shared
    /// by every market listing that symbol.
    pub fn price_of_listing(&self, position_id: &str, ticker: &str) -> Option<&PriceQuote> {
        self.prices
            .get(position_id)
            .or_else(|| self.price_of(ticker))
    }
}
