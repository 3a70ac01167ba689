//! The two total orders over ledger entries.
//!
//! Display order lists the most recent day first. Calculation order replays
//! oldest first so running balances come out right. Their same-day
//! priorities differ, so each has its own comparator and neither is derived
//! from the other. Position replay has a third order of its own: shares
//! must be acquired before a same-day disposal can draw them down.

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::str::FromStr;

use super::ledger_model::{EntrySubtype, LedgerEntry, SameDayCategory};

/// Same-day rank for display: outflows first, inflows last.
fn display_rank(category: SameDayCategory) -> u8 {
    match category {
        SameDayCategory::Outflow => 0,
        SameDayCategory::Purchase => 1,
        SameDayCategory::Income => 2,
        SameDayCategory::Sale => 3,
        SameDayCategory::Inflow => 4,
    }
}

/// Same-day rank for balance replay: money lands before it leaves.
fn calculation_rank(category: SameDayCategory) -> u8 {
    match category {
        SameDayCategory::Inflow => 0,
        SameDayCategory::Income => 1,
        SameDayCategory::Sale => 2,
        SameDayCategory::Purchase => 3,
        SameDayCategory::Outflow => 4,
    }
}

/// Sort key for record ids. Numeric ids compare by value and sort before
/// non-numeric ones, which compare as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum IdKey<'a> {
    Numeric(Decimal),
    Text(&'a str),
}

impl<'a> IdKey<'a> {
    pub fn of(id: &'a str) -> Self {
        match Decimal::from_str(id.trim()) {
            Ok(value) => IdKey::Numeric(value),
            Err(_) => IdKey::Text(id),
        }
    }
}

/// Date descending, then display rank, then ascending record id.
pub fn compare_for_display(a: &LedgerEntry, b: &LedgerEntry) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| {
            display_rank(a.subtype.category()).cmp(&display_rank(b.subtype.category()))
        })
        .then_with(|| IdKey::of(a.record_id()).cmp(&IdKey::of(b.record_id())))
        .then_with(|| a.id.cmp(&b.id))
}

/// Date ascending, then calculation rank, then descending record id.
// The descending id tie-break is kept for compatibility with existing ledgers.
pub fn compare_for_calculation(a: &LedgerEntry, b: &LedgerEntry) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| {
            calculation_rank(a.subtype.category()).cmp(&calculation_rank(b.subtype.category()))
        })
        .then_with(|| IdKey::of(b.record_id()).cmp(&IdKey::of(a.record_id())))
        .then_with(|| a.id.cmp(&b.id))
}

/// Same-day rank for position replay: acquisitions before disposals.
fn holdings_rank(subtype: EntrySubtype) -> u8 {
    match subtype {
        EntrySubtype::Buy | EntrySubtype::Dividend | EntrySubtype::SecurityTransferIn => 0,
        EntrySubtype::Sell | EntrySubtype::SecurityTransferOut => 1,
        _ => 2,
    }
}

/// Date ascending, then acquisitions before disposals, then ascending record id.
pub fn compare_for_holdings(a: &LedgerEntry, b: &LedgerEntry) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| holdings_rank(a.subtype).cmp(&holdings_rank(b.subtype)))
        .then_with(|| IdKey::of(a.record_id()).cmp(&IdKey::of(b.record_id())))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_for_holdings(entries: &mut [LedgerEntry]) {
    entries.sort_by(compare_for_holdings);
}

pub fn sort_for_display(entries: &mut [LedgerEntry]) {
    entries.sort_by(compare_for_display);
}

pub fn sort_for_calculation(entries: &mut [LedgerEntry]) {
    entries.sort_by(compare_for_calculation);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_key_orders_numbers_by_value() {
        assert!(IdKey::of("9") < IdKey::of("10"));
        assert!(IdKey::of("1700000000000") < IdKey::of("1700000000001"));
        assert!(IdKey::of("99999") < IdKey::of("abc"));
        assert!(IdKey::of("abc") < IdKey::of("abd"));
    }

    #[test]
    fn test_rank_tables_are_not_mirror_images() {
        let categories = [
            SameDayCategory::Outflow,
            SameDayCategory::Purchase,
            SameDayCategory::Income,
            SameDayCategory::Sale,
            SameDayCategory::Inflow,
        ];
        let mirrored = categories
            .iter()
            .all(|c| display_rank(*c) + calculation_rank(*c) == 4);
        assert!(!mirrored);
    }
}
