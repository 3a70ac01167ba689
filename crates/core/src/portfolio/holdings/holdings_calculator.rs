//! Weighted-average positions replayed from the transaction stream.

use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::holdings_model::{Position, PositionsResult};
use crate::accounts::Account;
use crate::activities::Transaction;
use crate::errors::CalculationWarning;
use crate::fx::{CurrencyNormalizer, Market};
use crate::ledger::{sort_for_holdings, unify_records, EntrySubtype, LedgerEntry};

/// Builds per-(market, ticker) positions from transactions.
///
/// Every BUY, stock DIVIDEND and security TRANSFER_IN blends into a single
/// running average cost. A BUY adds exactly the cash it consumed (gross value
/// plus fees, or the explicit amount), so the cost basis and the account's
/// cash effect always agree. SELL and TRANSFER_OUT reduce the quantity and
/// leave the average cost untouched.
pub struct HoldingsCalculator<'a> {
    normalizer: &'a CurrencyNormalizer<'a>,
}

impl<'a> HoldingsCalculator<'a> {
    pub fn new(normalizer: &'a CurrencyNormalizer<'a>) -> Self {
        Self { normalizer }
    }

    /// Replays `transactions` oldest first, acquisitions before same-day
    /// disposals.
    ///
    /// Malformed transactions and transactions on accounts that no longer
    /// exist are skipped and reported. Positions reduced to zero (or below)
    /// are kept.
    pub fn calculate_positions(
        &self,
        accounts: &[Account],
        transactions: &[Transaction],
    ) -> PositionsResult {
        let unified = unify_records(accounts, transactions, &[]);
        let mut warnings = unified.warnings;
        let mut entries = unified.entries;
        sort_for_holdings(&mut entries);

        let pinned_rates: HashMap<&str, Option<Decimal>> = transactions
            .iter()
            .map(|t| (t.id.as_str(), t.exchange_rate))
            .collect();

        let mut positions: HashMap<(Market, String), Position> = HashMap::new();
        for entry in &entries {
            let (Some(market), Some(ticker), Some(quantity), Some(price)) = (
                entry.market,
                entry.ticker.as_deref(),
                entry.quantity,
                entry.price,
            ) else {
                continue;
            };
            if entry.subtype == EntrySubtype::CashDividend {
                continue;
            }
            let position = positions
                .entry((market, ticker.to_string()))
                .or_insert_with(|| Position::new(market, ticker));
            let pinned = pinned_rates.get(entry.id.as_str()).copied().flatten();
            if let Some(warning) = self.apply(position, entry, quantity, price, pinned) {
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        let mut positions: Vec<Position> = positions.into_values().collect();
        positions.sort_by(|a, b| {
            a.market
                .as_str()
                .cmp(b.market.as_str())
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        debug!(
            "Calculated {} positions from {} transactions",
            positions.len(),
            transactions.len()
        );
        PositionsResult {
            positions,
            warnings,
        }
    }

    /// Applies one trade. Returns a warning when the trade could only be
    /// partially accounted for.
    fn apply(
        &self,
        position: &mut Position,
        entry: &LedgerEntry,
        quantity: Decimal,
        price: Decimal,
        pinned_rate: Option<Decimal>,
    ) -> Option<CalculationWarning> {
        if price > Decimal::ZERO {
            position.last_price = Some(price);
        }

        let (rate, mut warning) = match self
            .normalizer
            .rate_to_reporting(position.currency(), pinned_rate)
        {
            Ok((rate, _)) => (rate, None),
            Err(e) => (
                Decimal::ZERO,
                Some(CalculationWarning::new(
                    &entry.id,
                    Some(&entry.account_id),
                    format!("Reporting-currency cost left out: {}", e),
                )),
            ),
        };

        let market = position.market;
        let applied = match entry.subtype {
            EntrySubtype::Buy => add_shares(position, quantity, entry.amount, rate),
            EntrySubtype::Dividend | EntrySubtype::SecurityTransferIn => price
                .checked_mul(quantity)
                .map(|value| market.round_cash(value))
                .and_then(|value| add_shares(position, quantity, value, rate)),
            EntrySubtype::Sell => realize_sale(position, quantity, entry.amount, rate),
            EntrySubtype::SecurityTransferOut => position
                .quantity
                .checked_sub(quantity)
                .map(|remaining| position.quantity = remaining),
            _ => Some(()),
        };
        if applied.is_none() {
            return Some(CalculationWarning::new(
                &entry.id,
                Some(&entry.account_id),
                format!("Position {} is out of range; trade skipped", position.id()),
            ));
        }

        if position.quantity < Decimal::ZERO && warning.is_none() {
            warning = Some(CalculationWarning::new(
                &entry.id,
                Some(&entry.account_id),
                format!(
                    "Position {} went negative ({}); valued at zero",
                    position.id(),
                    position.quantity
                ),
            ));
        }
        warning
    }
}

/// Blends `quantity` shares acquired for `cost` into the running average.
///
/// Returns `None`, leaving the position untouched, when the result does not
/// fit in a `Decimal`.
fn add_shares(
    position: &mut Position,
    quantity: Decimal,
    cost: Decimal,
    rate: Decimal,
) -> Option<()> {
    let old_quantity = position.quantity;
    let new_quantity = old_quantity.checked_add(quantity)?;
    if new_quantity <= Decimal::ZERO {
        position.quantity = new_quantity;
        return Some(());
    }
    let cost_reporting = cost.checked_mul(rate)?;
    let (average_cost, average_cost_reporting) = if old_quantity <= Decimal::ZERO {
        // Any earlier cost belongs to shares no longer held.
        (
            cost.checked_div(new_quantity)?,
            cost_reporting.checked_div(new_quantity)?,
        )
    } else {
        let held = position.average_cost.checked_mul(old_quantity)?;
        let held_reporting = position.average_cost_reporting.checked_mul(old_quantity)?;
        (
            held.checked_add(cost)?.checked_div(new_quantity)?,
            held_reporting
                .checked_add(cost_reporting)?
                .checked_div(new_quantity)?,
        )
    };
    position.average_cost = average_cost;
    position.average_cost_reporting = average_cost_reporting;
    position.quantity = new_quantity;
    Some(())
}

/// Removes `quantity` sold shares and books `proceeds` against the average cost.
fn realize_sale(
    position: &mut Position,
    quantity: Decimal,
    proceeds: Decimal,
    rate: Decimal,
) -> Option<()> {
    let cost_local = position.average_cost.checked_mul(quantity)?;
    let cost_reporting = position.average_cost_reporting.checked_mul(quantity)?;
    let realized_local = position
        .realized_pl
        .local
        .checked_add(proceeds.checked_sub(cost_local)?)?;
    let realized_reporting = position
        .realized_pl
        .reporting
        .checked_add(proceeds.checked_mul(rate)?.checked_sub(cost_reporting)?)?;
    let remaining = position.quantity.checked_sub(quantity)?;

    position.realized_pl.local = realized_local;
    position.realized_pl.reporting = realized_reporting;
    position.quantity = remaining;
    Some(())
}
