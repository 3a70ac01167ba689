//! Merges the Transaction and CashFlow streams into one list of ledger entries.

use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashSet;

use super::ledger_model::{EntryKind, EntryOrigin, EntrySubtype, LedgerEntry, RecordRef};
use crate::accounts::{Account, AccountIndex};
use crate::activities::{ActivityError, CashFlow, CashFlowType, Transaction, TransactionType};
use crate::constants::TRANSFER_TARGET_SUFFIX;
use crate::errors::CalculationWarning;

/// Entries produced by one unification pass plus the records it skipped.
#[derive(Debug, Clone, Default)]
pub struct UnifiedRecords {
    pub entries: Vec<LedgerEntry>,
    pub warnings: Vec<CalculationWarning>,
}

/// Converts raw records into ledger entries.
///
/// Malformed records and records pointing at accounts that no longer exist
/// are skipped with a warning; every transfer with a live target account
/// yields a second, synthetic entry on that account.
pub struct RecordUnifier<'a> {
    accounts: AccountIndex<'a>,
    seen_ids: HashSet<String>,
    output: UnifiedRecords,
}

impl<'a> RecordUnifier<'a> {
    pub fn new(accounts: &'a [Account]) -> Self {
        Self {
            accounts: AccountIndex::new(accounts),
            seen_ids: HashSet::new(),
            output: UnifiedRecords::default(),
        }
    }

    pub fn unify(
        mut self,
        transactions: &[Transaction],
        cash_flows: &[CashFlow],
    ) -> UnifiedRecords {
        for transaction in transactions {
            if let Err(e) = self.push_transaction(transaction) {
                self.skip(&transaction.id, &transaction.account_id, e);
            }
        }
        for cash_flow in cash_flows {
            if let Err(e) = self.push_cash_flow(cash_flow) {
                self.skip(&cash_flow.id, &cash_flow.account_id, e);
            }
        }
        debug!(
            "Unified {} transactions and {} cash flows into {} ledger entries ({} skipped)",
            transactions.len(),
            cash_flows.len(),
            self.output.entries.len(),
            self.output.warnings.len()
        );
        self.output
    }

    fn skip(&mut self, record_id: &str, account_id: &str, error: ActivityError) {
        let warning = CalculationWarning::new(
            record_id,
            Some(account_id),
            format!("Skipped: {}", error),
        );
        warn!("{}", warning);
        self.output.warnings.push(warning);
    }

    fn claim_id(&mut self, id: &str) -> Result<(), ActivityError> {
        if !self.seen_ids.insert(id.to_string()) {
            return Err(ActivityError::invalid_data(id, "duplicate record id"));
        }
        Ok(())
    }

    fn require_account(&self, record_id: &str, account_id: &str) -> Result<&'a Account, ActivityError> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| ActivityError::UnknownAccount {
                record_id: record_id.to_string(),
                account_id: account_id.to_string(),
            })
    }

    fn push_transaction(&mut self, transaction: &Transaction) -> Result<(), ActivityError> {
        transaction.validate()?;
        let date = transaction.parsed_date()?;
        let account = self.require_account(&transaction.id, &transaction.account_id)?;
        self.claim_id(&transaction.id)?;

        let currency = transaction.currency();
        if account.currency != currency {
            warn!(
                "Transaction {} settles in {} but account {} holds {}; booking without conversion",
                transaction.id, currency, account.id, account.currency
            );
        }

        let subtype = match transaction.transaction_type {
            TransactionType::Buy => EntrySubtype::Buy,
            TransactionType::Sell => EntrySubtype::Sell,
            TransactionType::Dividend => EntrySubtype::Dividend,
            TransactionType::CashDividend => EntrySubtype::CashDividend,
            TransactionType::TransferIn => EntrySubtype::SecurityTransferIn,
            TransactionType::TransferOut => EntrySubtype::SecurityTransferOut,
        };

        self.output.entries.push(LedgerEntry {
            id: transaction.id.clone(),
            date,
            account_id: transaction.account_id.clone(),
            kind: EntryKind::Transaction,
            subtype,
            amount: transaction.cash_amount(),
            cash_effect: transaction.cash_effect(),
            currency: account.currency.clone(),
            fees: transaction.fees,
            record: RecordRef::Transaction(transaction.id.clone()),
            origin: EntryOrigin::Recorded,
            ticker: Some(transaction.ticker.clone()),
            market: Some(transaction.market),
            quantity: Some(transaction.quantity),
            price: Some(transaction.price),
            counterpart_account_id: None,
        });
        Ok(())
    }

    fn push_cash_flow(&mut self, cash_flow: &CashFlow) -> Result<(), ActivityError> {
        cash_flow.validate()?;
        let date = cash_flow.parsed_date()?;
        let account = self.require_account(&cash_flow.id, &cash_flow.account_id)?;
        self.claim_id(&cash_flow.id)?;

        let subtype = match cash_flow.flow_type {
            CashFlowType::Deposit => EntrySubtype::Deposit,
            CashFlowType::Withdraw => EntrySubtype::Withdraw,
            CashFlowType::Interest => EntrySubtype::Interest,
            CashFlowType::Transfer => EntrySubtype::Transfer,
        };

        self.output.entries.push(LedgerEntry {
            id: cash_flow.id.clone(),
            date,
            account_id: cash_flow.account_id.clone(),
            kind: EntryKind::Cashflow,
            subtype,
            amount: cash_flow.amount,
            cash_effect: cash_flow.cash_effect(),
            currency: account.currency.clone(),
            fees: cash_flow.fee_amt(),
            record: RecordRef::CashFlow(cash_flow.id.clone()),
            origin: EntryOrigin::Recorded,
            ticker: None,
            market: None,
            quantity: None,
            price: None,
            counterpart_account_id: cash_flow.target_account_id.clone(),
        });

        if !cash_flow.is_transfer_with_target() {
            return Ok(());
        }
        let target_id = cash_flow.target_account_id.as_deref().unwrap_or_default();
        let Some(target) = self.accounts.get(target_id) else {
            // The sending side still stands; only the receiving side is dropped.
            let warning = CalculationWarning::new(
                &cash_flow.id,
                Some(&cash_flow.account_id),
                format!(
                    "Transfer target account {} does not exist; receiving side skipped",
                    target_id
                ),
            );
            warn!("{}", warning);
            self.output.warnings.push(warning);
            return Ok(());
        };

        if target.currency != account.currency && cash_flow.exchange_rate.is_none() {
            warn!(
                "Transfer {} moves {} -> {} without a pinned rate; crediting 1:1",
                cash_flow.id, account.currency, target.currency
            );
        }

        let target_amount = cash_flow.target_amount();
        self.output.entries.push(LedgerEntry {
            id: format!("{}{}", cash_flow.id, TRANSFER_TARGET_SUFFIX),
            date,
            account_id: target.id.clone(),
            kind: EntryKind::Cashflow,
            subtype: EntrySubtype::TransferIn,
            amount: target_amount,
            cash_effect: target_amount,
            currency: target.currency.clone(),
            fees: Decimal::ZERO,
            record: RecordRef::CashFlow(cash_flow.id.clone()),
            origin: EntryOrigin::TransferTarget {
                derived_from: cash_flow.id.clone(),
            },
            ticker: None,
            market: None,
            quantity: None,
            price: None,
            counterpart_account_id: Some(cash_flow.account_id.clone()),
        });
        Ok(())
    }
}

/// Convenience wrapper running one unification pass.
pub fn unify_records(
    accounts: &[Account],
    transactions: &[Transaction],
    cash_flows: &[CashFlow],
) -> UnifiedRecords {
    RecordUnifier::new(accounts).unify(transactions, cash_flows)
}
