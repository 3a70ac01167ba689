//! Ledger module - unification of transactions and cash flows into one
//! per-account chronological ledger with running balances.

mod balance_accumulator;
mod ledger_builder;
mod ledger_model;
pub mod ledger_ordering;
mod record_unifier;


pub use balance_accumulator::{BalanceAccumulator, BalanceReplay};
pub use ledger_model::{
    BalancedEntry, EntryKind, EntryOrigin, EntrySubtype, Ledger, LedgerEntry, LedgerFilter,
    RecordRef, SameDayCategory,
};
pub use ledger_ordering::{
    compare_for_calculation, compare_for_display, compare_for_holdings, sort_for_calculation,
    sort_for_display, sort_for_holdings, IdKey,
};
pub use record_unifier::{unify_records, RecordUnifier, UnifiedRecords};
