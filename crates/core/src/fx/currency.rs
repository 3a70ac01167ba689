//! Markets and the cash conventions of the currencies they settle in.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::FxError;

/// Exchange a security trades on. Each market settles in one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Market {
    Tw,
    Us,
    Jp,
    Hk,
    Cn,
    Kr,
    Uk,
    Eu,
    Ca,
    Au,
    Sg,
    In,
    Ch,
    Th,
    Crypto,
}

impl Market {
    pub const ALL: [Market; 15] = [
        Market::Tw,
        Market::Us,
        Market::Jp,
        Market::Hk,
        Market::Cn,
        Market::Kr,
        Market::Uk,
        Market::Eu,
        Market::Ca,
        Market::Au,
        Market::Sg,
        Market::In,
        Market::Ch,
        Market::Th,
        Market::Crypto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Tw => "TW",
            Market::Us => "US",
            Market::Jp => "JP",
            Market::Hk => "HK",
            Market::Cn => "CN",
            Market::Kr => "KR",
            Market::Uk => "UK",
            Market::Eu => "EU",
            Market::Ca => "CA",
            Market::Au => "AU",
            Market::Sg => "SG",
            Market::In => "IN",
            Market::Ch => "CH",
            Market::Th => "TH",
            Market::Crypto => "CRYPTO",
        }
    }

    /// ISO 4217 code of the currency trades on this market settle in.
    pub fn currency(&self) -> &'static str {
        match self {
            Market::Tw => "TWD",
            Market::Us | Market::Crypto => "USD",
            Market::Jp => "JPY",
            Market::Hk => "HKD",
            Market::Cn => "CNY",
            Market::Kr => "KRW",
            Market::Uk => "GBP",
            Market::Eu => "EUR",
            Market::Ca => "CAD",
            Market::Au => "AUD",
            Market::Sg => "SGD",
            Market::In => "INR",
            Market::Ch => "CHF",
            Market::Th => "THB",
        }
    }

    /// Whether the smallest cash amount that can settle is one whole unit.
    pub fn has_integer_cash_unit(&self) -> bool {
        matches!(self, Market::Tw | Market::Jp | Market::Kr)
    }

    /// Applies the market's cash rounding to a gross trade value.
    ///
    /// Integer-unit markets floor; everything else is left untouched.
    pub fn round_cash(&self, amount: Decimal) -> Decimal {
        if self.has_integer_cash_unit() {
            amount.round_dp_with_strategy(0, RoundingStrategy::ToNegativeInfinity)
        } else {
            amount
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Market::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| FxError::UnknownMarket(s.to_string()))
    }
}
