use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::CalculationWarning;

/// Reporting-currency rollup of the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub reporting_currency: String,
    pub as_of: NaiveDate,
    /// Opening balances plus deposits minus withdrawals.
    ///
    /// Opening balances count as contributed capital, converted at the
    /// current rate. Transfers and interest never count.
    pub net_invested: Decimal,
    pub cash_balance: Decimal,
    pub holdings_value: Decimal,
    pub total_assets: Decimal,
    #[serde(rename = "totalPL")]
    pub total_pl: Decimal,
    #[serde(rename = "totalPLPercent")]
    pub total_pl_percent: Decimal,
    #[serde(rename = "realizedPL")]
    pub realized_pl: Decimal,
    #[serde(rename = "unrealizedPL")]
    pub unrealized_pl: Decimal,
    /// CAGR estimate as a fraction (0.1 = 10% a year)
    pub annualized_return: Decimal,
    pub inception_date: Option<NaiveDate>,
    /// Foreign currency -> average reporting-currency cost of one unit
    pub average_funding_rates: BTreeMap<String, Decimal>,
    pub warnings: Vec<CalculationWarning>,
}
