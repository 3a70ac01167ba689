use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CalculationWarning;
use crate::fx::Market;

/// An amount in the position's market currency and in the reporting currency.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryValue {
    pub local: Decimal,
    pub reporting: Decimal,
}

impl MonetaryValue {
    pub fn new(local: Decimal, reporting: Decimal) -> Self {
        MonetaryValue { local, reporting }
    }

    pub fn zero() -> Self {
        MonetaryValue::default()
    }
}

/// Where a holding's current price came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceSource {
    Feed,
    /// The feed had no price; the most recent trade price stands in.
    LastTransaction,
}

/// Running weighted-average position in one (market, ticker).
///
/// Built from transactions alone; carries no market prices.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub market: Market,
    pub ticker: String,
    pub quantity: Decimal,
    /// Average cost per share in the market currency, fees included.
    pub average_cost: Decimal,
    /// Average cost per share in the reporting currency.
    pub average_cost_reporting: Decimal,
    pub realized_pl: MonetaryValue,
    /// Price of the most recent trade with a positive price.
    pub last_price: Option<Decimal>,
}

impl Position {
    pub fn new(market: Market, ticker: &str) -> Self {
        Position {
            market,
            ticker: ticker.to_string(),
            quantity: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            average_cost_reporting: Decimal::ZERO,
            realized_pl: MonetaryValue::zero(),
            last_price: None,
        }
    }

    pub fn id(&self) -> String {
        position_id(self.market, &self.ticker)
    }

    pub fn currency(&self) -> &'static str {
        self.market.currency()
    }

    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// Cost of the shares still held; zero for flat or negative positions.
    pub fn cost_basis(&self) -> MonetaryValue {
        if !self.is_long() {
            return MonetaryValue::zero();
        }
        MonetaryValue::new(
            self.quantity * self.average_cost,
            self.quantity * self.average_cost_reporting,
        )
    }
}

pub fn position_id(market: Market, ticker: &str) -> String {
    format!("{}:{}", market.as_str(), ticker)
}

/// Valued position for display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub market: Market,
    pub ticker: String,
    /// Market currency
    pub currency: String,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub cost_basis: MonetaryValue,
    pub current_price: Decimal,
    pub price_source: PriceSource,
    pub market_value: MonetaryValue,
    pub unrealized_pl: MonetaryValue,
    /// Unrealized P/L over reporting cost basis, in percent
    pub unrealized_pl_percent: Decimal,
    pub realized_pl: MonetaryValue,
    pub day_change: Option<MonetaryValue>,
    /// Share of total reporting-currency holdings value, in percent
    pub weight: Decimal,
}

/// Positions built from the transaction stream plus the records skipped.
#[derive(Debug, Clone, Default)]
pub struct PositionsResult {
    pub positions: Vec<Position>,
    pub warnings: Vec<CalculationWarning>,
}

/// Valued holdings and their reporting-currency totals.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsValuation {
    pub holdings: Vec<Holding>,
    pub total_value: Decimal,
    pub total_cost_basis: Decimal,
    pub unrealized_pl: Decimal,
    pub realized_pl: Decimal,
    pub warnings: Vec<CalculationWarning>,
}
