//! Flow classification for invested-capital and funding-rate figures.
//!
//! Only DEPOSIT and WITHDRAW cross the portfolio boundary. TRANSFER moves
//! money between accounts and INTEREST is earned inside the portfolio, so
//! neither counts as invested capital.

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::accounts::{Account, AccountIndex};
use crate::activities::CashFlow;
use crate::errors::CalculationWarning;
use crate::fx::CurrencyNormalizer;
use crate::ledger::{unify_records, EntrySubtype, LedgerEntry};

/// Flow type for invested-capital accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Money entering or leaving the portfolio
    External,
    /// Money moving or accruing within the portfolio
    Internal,
}

pub fn classify_flow(subtype: EntrySubtype) -> FlowType {
    match subtype {
        EntrySubtype::Deposit | EntrySubtype::Withdraw => FlowType::External,
        _ => FlowType::Internal,
    }
}

/// A DEPOSIT or WITHDRAW normalized into the reporting currency.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalFlow {
    pub record_id: String,
    pub date: NaiveDate,
    pub subtype: EntrySubtype,
    /// Signed: positive for DEPOSIT, negative for WITHDRAW
    pub amount_reporting: Decimal,
}

/// Reporting-currency money spent to obtain foreign currency.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingEvent {
    pub record_id: String,
    pub currency: String,
    pub local_cost: Decimal,
    pub foreign_received: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct ClassifiedFlows {
    pub external: Vec<ExternalFlow>,
    pub funding: Vec<FundingEvent>,
    pub warnings: Vec<CalculationWarning>,
}

impl ClassifiedFlows {
    pub fn net_invested(&self) -> Decimal {
        self.external.iter().map(|f| f.amount_reporting).sum()
    }

    pub fn earliest_deposit(&self) -> Option<NaiveDate> {
        self.external
            .iter()
            .filter(|f| f.subtype == EntrySubtype::Deposit)
            .map(|f| f.date)
            .min()
    }
}

/// Classifies cash flows on existing accounts.
///
/// Malformed and dangling flows are dropped without a warning here; the
/// ledger pass reports them. Amounts that cannot be converted are reported.
pub fn classify_cash_flows(
    accounts: &[Account],
    cash_flows: &[CashFlow],
    normalizer: &CurrencyNormalizer<'_>,
) -> ClassifiedFlows {
    let index = AccountIndex::new(accounts);
    let raw: HashMap<&str, &CashFlow> = cash_flows.iter().map(|f| (f.id.as_str(), f)).collect();
    let entries = unify_records(accounts, &[], cash_flows).entries;
    let reporting = normalizer.reporting_currency();

    let mut classified = ClassifiedFlows::default();
    for entry in &entries {
        let Some(flow) = raw.get(entry.record_id()).copied() else {
            continue;
        };
        match entry.subtype {
            subtype if classify_flow(subtype) == FlowType::External => {
                let converted =
                    normalizer.to_reporting_currency(entry.amount, &entry.currency, flow.exchange_rate);
                match converted {
                    Ok(amount) => {
                        let signed = if entry.subtype == EntrySubtype::Deposit {
                            amount
                        } else {
                            -amount
                        };
                        classified.external.push(ExternalFlow {
                            record_id: entry.id.clone(),
                            date: entry.date,
                            subtype: entry.subtype,
                            amount_reporting: signed,
                        });
                        if entry.subtype == EntrySubtype::Deposit && entry.currency != reporting {
                            classified.funding.push(FundingEvent {
                                record_id: entry.id.clone(),
                                currency: entry.currency.clone(),
                                local_cost: amount,
                                foreign_received: entry.amount - entry.fees,
                            });
                        }
                    }
                    Err(e) => push_warning(
                        &mut classified,
                        entry,
                        format!("Left out of net invested: {}", e),
                    ),
                }
            }
            EntrySubtype::TransferIn => {
                let from_reporting = entry
                    .counterpart_account_id
                    .as_deref()
                    .and_then(|id| index.currency_of(id))
                    .is_some_and(|currency| currency == reporting);
                if from_reporting && entry.currency != reporting {
                    classified.funding.push(FundingEvent {
                        record_id: flow.id.clone(),
                        currency: entry.currency.clone(),
                        local_cost: flow.source_amount(),
                        foreign_received: entry.amount,
                    });
                }
            }
            _ => {}
        }
    }
    classified
}

fn push_warning(classified: &mut ClassifiedFlows, entry: &LedgerEntry, message: String) {
    let warning = CalculationWarning::new(&entry.id, Some(&entry.account_id), message);
    warn!("{}", warning);
    classified.warnings.push(warning);
}
