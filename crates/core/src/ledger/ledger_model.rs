//! Unified ledger domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::TRANSFER_TARGET_SUFFIX;
use crate::errors::CalculationWarning;
use crate::fx::Market;

/// Which record stream an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Transaction,
    Cashflow,
}

/// What the entry did to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntrySubtype {
    // Transactions
    Buy,
    Sell,
    Dividend,
    CashDividend,
    SecurityTransferIn,
    SecurityTransferOut,
    // Cash flows
    Deposit,
    Withdraw,
    Interest,
    /// Sending side of a transfer
    Transfer,
    /// Receiving side of a transfer, synthesized from the sending record
    TransferIn,
}

/// Same-day grouping shared by both entry orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameDayCategory {
    /// WITHDRAW, outgoing TRANSFER, securities transferred out
    Outflow,
    /// BUY
    Purchase,
    /// DIVIDEND, CASH_DIVIDEND, INTEREST
    Income,
    /// SELL
    Sale,
    /// DEPOSIT, incoming TRANSFER, securities transferred in
    Inflow,
}

impl EntrySubtype {
    pub fn category(&self) -> SameDayCategory {
        match self {
            EntrySubtype::Withdraw | EntrySubtype::Transfer | EntrySubtype::SecurityTransferOut => {
                SameDayCategory::Outflow
            }
            EntrySubtype::Buy => SameDayCategory::Purchase,
            EntrySubtype::Dividend | EntrySubtype::CashDividend | EntrySubtype::Interest => {
                SameDayCategory::Income
            }
            EntrySubtype::Sell => SameDayCategory::Sale,
            EntrySubtype::Deposit | EntrySubtype::TransferIn | EntrySubtype::SecurityTransferIn => {
                SameDayCategory::Inflow
            }
        }
    }
}

/// A stored record an entry points back to.
///
/// Edits and deletions always address the stored record, never a derived entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordRef {
    Transaction(String),
    CashFlow(String),
}

impl RecordRef {
    pub fn id(&self) -> &str {
        match self {
            RecordRef::Transaction(id) | RecordRef::CashFlow(id) => id,
        }
    }

    /// Resolves a display entry id to the record it must be deleted through.
    ///
    /// For callers that only hold the entry id string; entries carry the
    /// reference directly via [`LedgerEntry::deletion_target`].
    pub fn from_entry_id(kind: EntryKind, entry_id: &str) -> RecordRef {
        match kind {
            EntryKind::Transaction => RecordRef::Transaction(entry_id.to_string()),
            EntryKind::Cashflow => RecordRef::CashFlow(
                entry_id
                    .strip_suffix(TRANSFER_TARGET_SUFFIX)
                    .unwrap_or(entry_id)
                    .to_string(),
            ),
        }
    }
}

/// Whether an entry mirrors a stored record or was synthesized from one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryOrigin {
    Recorded,
    TransferTarget {
        #[serde(rename = "derivedFrom")]
        derived_from: String,
    },
}

/// One cash-relevant event on one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Stable id: the record id, or `{cashFlowId}-target` for a transfer's receiving side
    pub id: String,
    pub date: NaiveDate,
    pub account_id: String,
    pub kind: EntryKind,
    pub subtype: EntrySubtype,
    /// Unsigned cash amount shown for the entry
    pub amount: Decimal,
    /// Signed change to the account's cash balance
    pub cash_effect: Decimal,
    /// Currency of `amount` and `cash_effect`
    pub currency: String,
    pub fees: Decimal,
    pub record: RecordRef,
    pub origin: EntryOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<Market>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Counterpart account of a transfer (target on the sending side, source on the receiving side)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterpart_account_id: Option<String>,
}

impl LedgerEntry {
    pub fn is_synthetic(&self) -> bool {
        matches!(self.origin, EntryOrigin::TransferTarget { .. })
    }

    pub fn is_source_record(&self) -> bool {
        !self.is_synthetic()
    }

    /// The stored record deleting this entry must operate on.
    pub fn deletion_target(&self) -> RecordRef {
        self.record.clone()
    }

    /// Id of the stored record, used for same-day tie-breaks.
    pub fn record_id(&self) -> &str {
        self.record.id()
    }
}

/// A ledger entry annotated with the account balance right after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancedEntry {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub balance: Decimal,
}

/// Restricts which entries a ledger view replays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerFilter {
    pub account_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl LedgerFilter {
    pub fn for_account(account_id: &str) -> Self {
        Self {
            account_id: Some(account_id.to_string()),
            ..Default::default()
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.account_id.is_none() && self.from.is_none() && self.to.is_none()
    }

    pub fn includes_account(&self, account_id: &str) -> bool {
        self.account_id.as_deref().map_or(true, |id| id == account_id)
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        self.includes_account(&entry.account_id)
            && self.from.map_or(true, |from| entry.date >= from)
            && self.to.map_or(true, |to| entry.date <= to)
    }
}

/// Display-ordered, balance-annotated ledger for one (possibly filtered) view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// Entries in display order (most recent first)
    pub entries: Vec<BalancedEntry>,
    /// Balance of each replayed account after its last entry
    pub closing_balances: HashMap<String, Decimal>,
    pub warnings: Vec<CalculationWarning>,
}
