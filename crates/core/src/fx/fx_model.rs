use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::FxError;

/// An ordered currency pair. A rate on `FROM/TO` is the number of `TO` units
/// one `FROM` unit buys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

impl CurrencyPair {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.trim().to_ascii_uppercase(),
            to: to.trim().to_ascii_uppercase(),
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

impl FromStr for CurrencyPair {
    type Err = FxError;

    /// Accepts `FX:EUR/USD`, `EUR/USD`, `EUR:USD`, `EURUSD` and `EURUSD=X`.
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let key = key.trim();
        let body = key.strip_prefix("FX:").unwrap_or(key);
        let (from, to) = if let Some(pair) = body.split_once('/') {
            pair
        } else if let Some(pair) = body.split_once(':') {
            pair
        } else {
            let symbol = body.strip_suffix("=X").unwrap_or(body);
            if symbol.len() != 6 || !symbol.is_ascii() {
                return Err(FxError::InvalidCurrencyPair(key.to_string()));
            }
            symbol.split_at(3)
        };
        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(FxError::InvalidCurrencyPair(key.to_string()));
        }
        Ok(CurrencyPair::new(from, to))
    }
}

impl Serialize for CurrencyPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CurrencyPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Current global exchange rates as supplied by the price feed.
pub type RateTable = HashMap<CurrencyPair, Decimal>;
