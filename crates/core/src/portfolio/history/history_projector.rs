//! Year-bucketed value and P/L series.

use chrono::{Datelike, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::history_model::{ValueSource, YearEndValuation, YearPerformance};
use crate::portfolio::holdings::percent_of;
use crate::portfolio::summary::ExternalFlow;

/// Inputs for one projection, all in the reporting currency.
pub struct HistoryInputs<'a> {
    /// Invested capital present before the first flow (opening balances)
    pub opening_value: Decimal,
    pub external_flows: &'a [ExternalFlow],
    /// First year with any ledger activity
    pub first_year: Option<i32>,
    pub observed: &'a [YearEndValuation],
    pub as_of: NaiveDate,
    /// Live total assets, used as the current year's end value
    pub current_value: Decimal,
}

pub struct TimeSeriesProjector {
    assumed_growth_rate: Decimal,
}

impl TimeSeriesProjector {
    pub fn new(assumed_growth_rate: Decimal) -> Self {
        Self {
            assumed_growth_rate,
        }
    }

    /// One row per calendar year from the first active year through the
    /// year of `as_of`.
    ///
    /// Years without a caller-supplied valuation are carried forward at the
    /// assumed growth rate and marked [`ValueSource::Estimated`].
    pub fn project(&self, inputs: &HistoryInputs<'_>) -> Vec<YearPerformance> {
        let current_year = inputs.as_of.year();
        let Some(first_year) = inputs.first_year.filter(|y| *y <= current_year) else {
            return Vec::new();
        };

        let mut inflows: BTreeMap<i32, Decimal> = BTreeMap::new();
        for flow in inputs.external_flows {
            *inflows.entry(flow.date.year()).or_insert(Decimal::ZERO) += flow.amount_reporting;
        }
        let observed: HashMap<i32, Decimal> =
            inputs.observed.iter().map(|v| (v.year, v.value)).collect();

        let mut series = Vec::new();
        let mut start_value = inputs.opening_value;
        let mut cumulative_cost = inputs.opening_value;
        for year in first_year..=current_year {
            let net_inflow = inflows.get(&year).copied().unwrap_or(Decimal::ZERO);
            cumulative_cost += net_inflow;

            let (end_value, source) = if year == current_year {
                (inputs.current_value, ValueSource::Observed)
            } else if let Some(value) = observed.get(&year) {
                (*value, ValueSource::Observed)
            } else {
                (
                    start_value * (Decimal::ONE + self.assumed_growth_rate) + net_inflow,
                    ValueSource::Estimated,
                )
            };

            let profit_loss = end_value - start_value - net_inflow;
            series.push(YearPerformance {
                year,
                start_value,
                end_value,
                net_inflow,
                cumulative_cost,
                profit_loss,
                return_percent: percent_of(profit_loss, start_value + net_inflow),
                source,
            });
            start_value = end_value;
        }

        debug!(
            "Projected {} years ({} estimated)",
            series.len(),
            series
                .iter()
                .filter(|y| y.source == ValueSource::Estimated)
                .count()
        );
        series
    }
}
