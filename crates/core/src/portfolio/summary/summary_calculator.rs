//! Portfolio-level totals and the annualized return estimate.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::prelude::MathematicalOps;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::flow_classifier::{classify_cash_flows, FundingEvent};
use super::summary_model::PortfolioSummary;
use crate::accounts::Account;
use crate::activities::CashFlow;
use crate::constants::{DAYS_PER_YEAR, DECIMAL_PRECISION, MIN_ANNUALIZATION_YEARS};
use crate::errors::{CalculationWarning, CalculatorError};
use crate::fx::CurrencyNormalizer;
use crate::ledger::{EntrySubtype, Ledger};
use crate::portfolio::holdings::{percent_of, HoldingsValuation};

/// Everything the summary is computed from.
pub struct SummaryInputs<'a> {
    pub accounts: &'a [Account],
    pub cash_flows: &'a [CashFlow],
    /// Full, unfiltered ledger
    pub ledger: &'a Ledger,
    pub holdings: &'a HoldingsValuation,
    pub as_of: NaiveDate,
}

pub struct PortfolioSummaryCalculator<'a> {
    normalizer: &'a CurrencyNormalizer<'a>,
}

impl<'a> PortfolioSummaryCalculator<'a> {
    pub fn new(normalizer: &'a CurrencyNormalizer<'a>) -> Self {
        Self { normalizer }
    }

    pub fn calculate(&self, inputs: &SummaryInputs<'_>) -> PortfolioSummary {
        let mut warnings = Vec::new();

        let flows = classify_cash_flows(inputs.accounts, inputs.cash_flows, self.normalizer);
        warnings.extend(flows.warnings.iter().cloned());

        let opening_invested = self.sum_converted(
            inputs
                .accounts
                .iter()
                .map(|a| (a.id.as_str(), a.opening_balance, a.currency.as_str())),
            &mut warnings,
        );
        let net_invested = opening_invested + flows.net_invested();

        // Cash is valued at current rates only.
        let cash_balance = self.sum_converted(
            inputs
                .accounts
                .iter()
                .map(|a| (a.id.as_str(), inputs.ledger.balance_of(&a.id), a.currency.as_str())),
            &mut warnings,
        );

        let holdings_value = inputs.holdings.total_value;
        let total_assets = holdings_value + cash_balance;
        let total_pl = total_assets - net_invested;
        let total_pl_percent = percent_of(total_pl, net_invested);

        let inception_date = flows.earliest_deposit().or_else(|| {
            inputs
                .ledger
                .ledger_entries()
                .filter(|e| e.subtype == EntrySubtype::Buy)
                .map(|e| e.date)
                .min()
        });

        let annualized_return = match inception_date {
            Some(start) => {
                match annualized_return(total_assets, net_invested, start, inputs.as_of) {
                    Ok(rate) => rate,
                    Err(e) => {
                        let warning = CalculationWarning::new(
                            "portfolio",
                            None,
                            format!("Annualized return unavailable: {}", e),
                        );
                        warn!("{}", warning);
                        warnings.push(warning);
                        Decimal::ZERO
                    }
                }
            }
            None => Decimal::ZERO,
        };

        debug!(
            "Summary as of {}: net invested {}, total assets {}, annualized {}",
            inputs.as_of, net_invested, total_assets, annualized_return
        );

        PortfolioSummary {
            reporting_currency: self.normalizer.reporting_currency().to_string(),
            as_of: inputs.as_of,
            net_invested,
            cash_balance,
            holdings_value,
            total_assets,
            total_pl,
            total_pl_percent,
            realized_pl: inputs.holdings.realized_pl,
            unrealized_pl: inputs.holdings.unrealized_pl,
            annualized_return,
            inception_date,
            average_funding_rates: average_funding_rates(&flows.funding),
            warnings,
        }
    }

    /// Sums per-account amounts at current rates, reporting the ones that
    /// cannot be converted.
    fn sum_converted<'b>(
        &self,
        amounts: impl Iterator<Item = (&'b str, Decimal, &'b str)>,
        warnings: &mut Vec<CalculationWarning>,
    ) -> Decimal {
        let mut total = Decimal::ZERO;
        for (account_id, amount, currency) in amounts {
            if amount.is_zero() {
                continue;
            }
            match self.normalizer.to_reporting_currency(amount, currency, None) {
                Ok(converted) => total += converted,
                Err(e) => {
                    let warning = CalculationWarning::new(
                        account_id,
                        Some(account_id),
                        format!("Cash left out of totals: {}", e),
                    );
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }
        total
    }
}

/// Simplified CAGR: `(totalAssets / netInvested)^(1 / years) - 1`.
///
/// Only the inception date enters the calculation; the timing of later cash
/// flows is ignored, so this is a proxy for a money-weighted return rather
/// than one. Returns zero for periods shorter than
/// [`MIN_ANNUALIZATION_YEARS`] and when either amount is not positive.
pub fn annualized_return(
    total_assets: Decimal,
    net_invested: Decimal,
    inception: NaiveDate,
    as_of: NaiveDate,
) -> Result<Decimal, CalculatorError> {
    let days = Decimal::from((as_of - inception).num_days());
    let years = days / DAYS_PER_YEAR;
    if years <= MIN_ANNUALIZATION_YEARS
        || net_invested <= Decimal::ZERO
        || total_assets <= Decimal::ZERO
    {
        return Ok(Decimal::ZERO);
    }
    let growth = total_assets
        .checked_div(net_invested)
        .ok_or_else(|| CalculatorError::Overflow("total asset ratio".to_string()))?;
    let exponent = Decimal::ONE
        .checked_div(years)
        .ok_or_else(|| CalculatorError::Overflow("annualization exponent".to_string()))?;
    let compounded = growth
        .checked_powd(exponent)
        .ok_or_else(|| CalculatorError::Overflow("annualized growth".to_string()))?;
    Ok((compounded - Decimal::ONE).round_dp(DECIMAL_PRECISION))
}

/// `Σ local cost / Σ foreign received` per foreign currency.
pub fn average_funding_rates(events: &[FundingEvent]) -> BTreeMap<String, Decimal> {
    let mut sums: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for event in events {
        let entry = sums
            .entry(event.currency.clone())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += event.local_cost;
        entry.1 += event.foreign_received;
    }
    sums.into_iter()
        .filter(|(_, (_, received))| *received > Decimal::ZERO)
        .map(|(currency, (cost, received))| {
            (currency, (cost / received).round_dp(DECIMAL_PRECISION))
        })
        .collect()
}
