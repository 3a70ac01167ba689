use crate::fx::fx_errors::FxError;
use crate::fx::fx_model::{CurrencyPair, RateTable};
use log::warn;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Resolves conversion rates from a table of current global rates.
///
/// Rates are stored as a graph: each quoted pair adds an edge and its
/// inverse, so a conversion can use a direct quote, an inverted one, or a
/// chain of quotes through intermediate currencies.
#[derive(Debug, Clone, Default)]
pub struct CurrencyConverter {
    /// Currency -> currencies it has a rate to.
    adj: HashMap<String, BTreeSet<String>>,
    rates: HashMap<(String, String), Decimal>,
    /// Pairs present in the source table, as opposed to derived inverses.
    quoted: HashSet<(String, String)>,
}

impl CurrencyConverter {
    pub fn new(table: &RateTable) -> Self {
        let mut converter = CurrencyConverter::default();
        for (pair, rate) in table {
            converter.add_rate(pair, *rate);
        }
        converter
    }

    /// Adds one quoted rate and its inverse. Non-positive rates are ignored.
    ///
    /// A directly quoted rate always wins over one derived by inversion.
    pub fn add_rate(&mut self, pair: &CurrencyPair, rate: Decimal) {
        if pair.from == pair.to {
            return;
        }
        if rate <= Decimal::ZERO {
            warn!("Ignoring non-positive exchange rate {} for {}", rate, pair);
            return;
        }

        let forward = (pair.from.clone(), pair.to.clone());
        let inverse = (pair.to.clone(), pair.from.clone());

        self.rates.insert(forward.clone(), rate);
        self.quoted.insert(forward);
        self.adj
            .entry(pair.from.clone())
            .or_default()
            .insert(pair.to.clone());

        if !self.quoted.contains(&inverse) {
            self.rates.insert(inverse, Decimal::ONE / rate);
            self.adj
                .entry(pair.to.clone())
                .or_default()
                .insert(pair.from.clone());
        }
    }

    fn get_direct_rate(&self, from: &str, to: &str) -> Option<Decimal> {
        self.rates.get(&(from.to_string(), to.to_string())).copied()
    }

    /// Returns how many `to` units one `from` unit buys.
    ///
    /// Uses breadth-first search so the shortest chain of quotes is preferred.
    pub fn get_rate(&self, from_currency: &str, to_currency: &str) -> Result<Decimal, FxError> {
        if from_currency == to_currency {
            return Ok(Decimal::ONE);
        }

        let mut queue: VecDeque<(String, Decimal)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();

        queue.push_back((from_currency.to_string(), Decimal::ONE));
        visited.insert(from_currency.to_string());

        while let Some((current, accumulated)) = queue.pop_front() {
            if current == to_currency {
                return Ok(accumulated);
            }
            if let Some(neighbors) = self.adj.get(&current) {
                for neighbor in neighbors {
                    if visited.contains(neighbor) {
                        continue;
                    }
                    let Some(next) = self
                        .get_direct_rate(&current, neighbor)
                        .and_then(|rate| accumulated.checked_mul(rate))
                    else {
                        continue;
                    };
                    visited.insert(neighbor.clone());
                    queue.push_back((neighbor.clone(), next));
                }
            }
        }

        Err(FxError::RateNotFound(format!(
            "No conversion path found for {} -> {}",
            from_currency, to_currency
        )))
    }

    pub fn convert_amount(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<Decimal, FxError> {
        let rate = self.get_rate(from_currency, to_currency)?;
        amount.checked_mul(rate).ok_or_else(|| {
            FxError::ConversionOverflow(format!(
                "{} {} -> {}",
                amount, from_currency, to_currency
            ))
        })
    }
}
