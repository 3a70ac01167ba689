use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Portfolio value at the end of a calendar year, as recorded by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearEndValuation {
    pub year: i32,
    /// Total assets in the reporting currency
    pub value: Decimal,
}

/// Whether a year's end value was observed or projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueSource {
    Observed,
    /// Projected from the previous year at the assumed growth rate
    Estimated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPerformance {
    pub year: i32,
    pub start_value: Decimal,
    pub end_value: Decimal,
    /// Deposits minus withdrawals during the year
    pub net_inflow: Decimal,
    /// Invested capital at year end
    pub cumulative_cost: Decimal,
    /// `endValue - startValue - netInflow`
    pub profit_loss: Decimal,
    /// Profit/loss over `startValue + netInflow`, in percent
    pub return_percent: Decimal,
    pub source: ValueSource,
}
