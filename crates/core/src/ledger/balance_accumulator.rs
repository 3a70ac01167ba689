//! Running cash balances replayed in calculation order.

use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::ledger_model::LedgerEntry;
use super::ledger_ordering::compare_for_calculation;
use crate::accounts::AccountIndex;
use crate::errors::CalculationWarning;

/// Result of one replay pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceReplay {
    /// Entry id -> account balance immediately after that entry
    pub balance_at_entry: HashMap<String, Decimal>,
    /// Account id -> balance after the account's last replayed entry
    pub closing_balances: HashMap<String, Decimal>,
    /// Entries whose cash effect would push a balance out of range
    pub warnings: Vec<CalculationWarning>,
}

/// Threads a running balance per account through a set of entries.
///
/// Each call is an independent pass over exactly the entries given: a
/// filtered view must be replayed on its own, not sliced out of a replay of
/// the full ledger.
pub struct BalanceAccumulator<'a> {
    accounts: &'a AccountIndex<'a>,
}

impl<'a> BalanceAccumulator<'a> {
    pub fn new(accounts: &'a AccountIndex<'a>) -> Self {
        Self { accounts }
    }

    /// Replays `entries` in calculation order, whatever order they arrive in.
    ///
    /// Balances of the accounts accepted by `include_account` start at their
    /// opening balance; accounts without an opening balance start at zero.
    pub fn replay(
        &self,
        entries: &[LedgerEntry],
        include_account: impl Fn(&str) -> bool,
    ) -> BalanceReplay {
        let mut running: HashMap<String, Decimal> = self
            .accounts
            .accounts()
            .filter(|account| include_account(&account.id))
            .map(|account| (account.id.clone(), account.opening_balance))
            .collect();

        let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
        ordered.sort_by(|a, b| compare_for_calculation(a, b));

        let mut balance_at_entry = HashMap::with_capacity(ordered.len());
        let mut warnings = Vec::new();
        for entry in ordered {
            let balance = running
                .entry(entry.account_id.clone())
                .or_insert_with(|| self.accounts.opening_balance(&entry.account_id));
            match balance.checked_add(entry.cash_effect) {
                Some(next) => *balance = next,
                None => {
                    let warning = CalculationWarning::new(
                        &entry.id,
                        Some(&entry.account_id),
                        format!("Balance out of range; cash effect {} skipped", entry.cash_effect),
                    );
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
            balance_at_entry.insert(entry.id.clone(), *balance);
        }

        debug!(
            "Replayed {} entries across {} accounts",
            balance_at_entry.len(),
            running.len()
        );

        BalanceReplay {
            balance_at_entry,
            closing_balances: running,
            warnings,
        }
    }
}
