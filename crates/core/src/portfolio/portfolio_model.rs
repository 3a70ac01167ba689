use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::accounts::Account;
use crate::activities::{CashFlow, Transaction};
use crate::errors::CalculationWarning;
use crate::ledger::Ledger;
use crate::market_data::MarketSnapshot;
use crate::portfolio::history::{YearEndValuation, YearPerformance};
use crate::portfolio::holdings::HoldingsValuation;
use crate::portfolio::summary::PortfolioSummary;

/// Everything a recomputation reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioBook {
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub cash_flows: Vec<CashFlow>,
    #[serde(default)]
    pub year_end_valuations: Vec<YearEndValuation>,
}

/// Immutable result of one successful recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub generation: u64,
    pub as_of: NaiveDate,
    pub ledger: Ledger,
    pub holdings: HoldingsValuation,
    pub summary: PortfolioSummary,
    pub history: Vec<YearPerformance>,
    /// Market data the snapshot was valued with
    pub market: MarketSnapshot,
    /// Every recovered problem, each reported once
    pub warnings: Vec<CalculationWarning>,
}

/// Drops repeated warnings, keeping the first occurrence.
pub(crate) fn dedup_warnings(
    warnings: impl IntoIterator<Item = CalculationWarning>,
) -> Vec<CalculationWarning> {
    let mut seen = HashSet::new();
    warnings
        .into_iter()
        .filter(|w| seen.insert((w.record_id.clone(), w.message.clone())))
        .collect()
}
