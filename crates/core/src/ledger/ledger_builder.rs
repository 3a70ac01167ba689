//! Assembles display-ordered, balance-annotated ledgers.

use log::debug;
use rust_decimal::Decimal;

use super::balance_accumulator::BalanceAccumulator;
use super::ledger_model::{BalancedEntry, Ledger, LedgerEntry, LedgerFilter};
use super::ledger_ordering::{compare_for_calculation, sort_for_display};
use super::record_unifier::unify_records;
use crate::accounts::{Account, AccountIndex};
use crate::activities::{CashFlow, Transaction};

impl Ledger {
    /// Builds the full ledger over every account.
    pub fn build(
        accounts: &[Account],
        transactions: &[Transaction],
        cash_flows: &[CashFlow],
    ) -> Ledger {
        Ledger::build_filtered(accounts, transactions, cash_flows, &LedgerFilter::default())
    }

    /// Builds a ledger over the entries matching `filter`.
    ///
    /// The matching entries are replayed on their own, so the balances shown
    /// describe the filtered view rather than the full ledger.
    pub fn build_filtered(
        accounts: &[Account],
        transactions: &[Transaction],
        cash_flows: &[CashFlow],
        filter: &LedgerFilter,
    ) -> Ledger {
        let unified = unify_records(accounts, transactions, cash_flows);
        let mut entries: Vec<LedgerEntry> = unified
            .entries
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect();

        let index = AccountIndex::new(accounts);
        let mut replay =
            BalanceAccumulator::new(&index).replay(&entries, |id| filter.includes_account(id));
        let mut warnings = unified.warnings;
        warnings.append(&mut replay.warnings);

        sort_for_display(&mut entries);
        let entries = entries
            .into_iter()
            .map(|entry| {
                let balance = replay
                    .balance_at_entry
                    .get(&entry.id)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                BalancedEntry { entry, balance }
            })
            .collect::<Vec<_>>();

        debug!(
            "Built ledger with {} entries (filtered: {})",
            entries.len(),
            !filter.is_unfiltered()
        );

        Ledger {
            entries,
            closing_balances: replay.closing_balances,
            warnings,
        }
    }

    /// Entries in calculation order (oldest first).
    pub fn calculation_order(&self) -> Vec<&BalancedEntry> {
        let mut ordered: Vec<&BalancedEntry> = self.entries.iter().collect();
        ordered.sort_by(|a, b| compare_for_calculation(&a.entry, &b.entry));
        ordered
    }

    pub fn entry(&self, entry_id: &str) -> Option<&BalancedEntry> {
        self.entries.iter().find(|e| e.entry.id == entry_id)
    }

    /// Closing balance of an account, zero when it was not replayed.
    pub fn balance_of(&self, account_id: &str) -> Decimal {
        self.closing_balances
            .get(account_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Unannotated entries in display order.
    pub fn ledger_entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().map(|e| &e.entry)
    }
}
