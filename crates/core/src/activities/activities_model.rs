//! Transaction and CashFlow domain models.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::activities::activities_errors::ActivityError;
use crate::activities::RECORD_DATE_FORMATS;
use crate::errors::CalculationWarning;
use crate::fx::Market;

/// Parses a stored record date (RFC 3339 or one of [`RECORD_DATE_FORMATS`]).
pub fn parse_record_date(record_id: &str, value: &str) -> Result<NaiveDate, ActivityError> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    for format in RECORD_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.date());
        }
    }
    Err(ActivityError::InvalidDate {
        record_id: record_id.to_string(),
        value: value.to_string(),
    })
}

/// Parses a JSON array of records one element at a time.
///
/// Elements that fail to deserialize are skipped and reported as warnings
/// so that one bad record never discards the rest of the stream.
fn parse_records<T: DeserializeOwned>(
    json: &str,
) -> serde_json::Result<(Vec<T>, Vec<CalculationWarning>)> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut records = Vec::with_capacity(raw.len());
    let mut warnings = Vec::new();
    for (position, value) in raw.into_iter().enumerate() {
        let record_id = value
            .get("id")
            .map(|id| match id {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| format!("#{}", position));
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                let warning =
                    CalculationWarning::new(record_id, None, format!("Unreadable record: {}", e));
                log::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }
    Ok((records, warnings))
}

/// Kind of security event recorded by a [`Transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Buy,
    Sell,
    /// Stock dividend / reinvestment: shares change, cash does not.
    Dividend,
    CashDividend,
    TransferIn,
    TransferOut,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
            TransactionType::Dividend => "DIVIDEND",
            TransactionType::CashDividend => "CASH_DIVIDEND",
            TransactionType::TransferIn => "TRANSFER_IN",
            TransactionType::TransferOut => "TRANSFER_OUT",
        }
    }
}

/// A security trade or dividend event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Trade date as stored (`YYYY-MM-DD` or RFC 3339)
    pub date: String,
    pub account_id: String,
    pub ticker: String,
    pub market: Market,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub price: Decimal,
    pub quantity: Decimal,
    #[serde(default)]
    pub fees: Decimal,
    /// Pre-computed cash amount; replaces the price x quantity derivation
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Market currency -> reporting currency rate recorded at trade time
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Transaction {
    /// Parses a JSON array of transactions, skipping unreadable elements.
    pub fn parse_many(json: &str) -> serde_json::Result<(Vec<Self>, Vec<CalculationWarning>)> {
        parse_records(json)
    }

    pub fn parsed_date(&self) -> Result<NaiveDate, ActivityError> {
        parse_record_date(&self.id, &self.date)
    }

    /// Currency the trade settles in.
    pub fn currency(&self) -> &'static str {
        self.market.currency()
    }

    /// Rejects records no calculation can use.
    pub fn validate(&self) -> Result<(), ActivityError> {
        if self.ticker.trim().is_empty() {
            return Err(ActivityError::invalid_data(&self.id, "ticker is empty"));
        }
        if self.quantity < Decimal::ZERO {
            return Err(ActivityError::invalid_data(
                &self.id,
                format!("negative quantity {}", self.quantity),
            ));
        }
        if self.price < Decimal::ZERO {
            return Err(ActivityError::invalid_data(
                &self.id,
                format!("negative price {}", self.price),
            ));
        }
        if self.fees < Decimal::ZERO {
            return Err(ActivityError::invalid_data(
                &self.id,
                format!("negative fees {}", self.fees),
            ));
        }
        if let Some(amount) = self.amount {
            if amount < Decimal::ZERO {
                return Err(ActivityError::invalid_data(
                    &self.id,
                    format!("negative amount {}", amount),
                ));
            }
        }
        // Every cash and cost figure derived later is bounded by this sum.
        if self
            .price
            .checked_mul(self.quantity)
            .and_then(|gross| gross.checked_add(self.fees))
            .is_none()
        {
            return Err(ActivityError::invalid_data(
                &self.id,
                format!(
                    "price {} x quantity {} is out of range",
                    self.price, self.quantity
                ),
            ));
        }
        Ok(())
    }

    /// `price x quantity` after the market's cash rounding.
    pub fn gross_value(&self) -> Decimal {
        self.market.round_cash(self.price * self.quantity)
    }

    /// Unsigned cash amount of the trade.
    ///
    /// An explicit `amount` wins. Otherwise the rounded gross value is
    /// adjusted by fees: added for a BUY, deducted for cash received.
    pub fn cash_amount(&self) -> Decimal {
        if let Some(amount) = self.amount {
            return amount;
        }
        let gross = self.gross_value();
        match self.transaction_type {
            TransactionType::Buy => gross + self.fees,
            TransactionType::Sell | TransactionType::CashDividend => gross - self.fees,
            TransactionType::Dividend
            | TransactionType::TransferIn
            | TransactionType::TransferOut => gross,
        }
    }

    /// Signed effect on the account's cash balance.
    pub fn cash_effect(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Buy => -self.cash_amount(),
            TransactionType::Sell | TransactionType::CashDividend => self.cash_amount(),
            TransactionType::Dividend
            | TransactionType::TransferIn
            | TransactionType::TransferOut => Decimal::ZERO,
        }
    }

    /// Signed change in share count.
    pub fn share_delta(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Buy | TransactionType::Dividend | TransactionType::TransferIn => {
                self.quantity
            }
            TransactionType::Sell | TransactionType::TransferOut => -self.quantity,
            TransactionType::CashDividend => Decimal::ZERO,
        }
    }
}

/// Kind of pure cash movement recorded by a [`CashFlow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashFlowType {
    Deposit,
    #[serde(alias = "WITHDRAWAL")]
    Withdraw,
    Transfer,
    Interest,
}

impl CashFlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CashFlowType::Deposit => "DEPOSIT",
            CashFlowType::Withdraw => "WITHDRAW",
            CashFlowType::Transfer => "TRANSFER",
            CashFlowType::Interest => "INTEREST",
        }
    }
}

/// A pure cash movement on one account, or between two accounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub id: String,
    pub date: String,
    pub account_id: String,
    #[serde(rename = "type")]
    pub flow_type: CashFlowType,
    /// Amount in the account's currency
    pub amount: Decimal,
    #[serde(default)]
    pub fee: Option<Decimal>,
    /// DEPOSIT/WITHDRAW/INTEREST: account currency -> reporting currency.
    /// TRANSFER: source account currency -> target account currency.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    #[serde(default)]
    pub target_account_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl CashFlow {
    /// Parses a JSON array of cash flows, skipping unreadable elements.
    pub fn parse_many(json: &str) -> serde_json::Result<(Vec<Self>, Vec<CalculationWarning>)> {
        parse_records(json)
    }

    pub fn parsed_date(&self) -> Result<NaiveDate, ActivityError> {
        parse_record_date(&self.id, &self.date)
    }

    pub fn fee_amt(&self) -> Decimal {
        self.fee.unwrap_or(Decimal::ZERO)
    }

    pub fn validate(&self) -> Result<(), ActivityError> {
        if self.amount <= Decimal::ZERO {
            return Err(ActivityError::invalid_data(
                &self.id,
                format!("amount must be positive, got {}", self.amount),
            ));
        }
        if self.fee_amt() < Decimal::ZERO {
            return Err(ActivityError::invalid_data(
                &self.id,
                format!("negative fee {}", self.fee_amt()),
            ));
        }
        if self.flow_type == CashFlowType::Transfer
            && self.target_account_id.as_deref() == Some(self.account_id.as_str())
        {
            return Err(ActivityError::invalid_data(
                &self.id,
                "transfer target is the source account",
            ));
        }
        if let Some(rate) = self.exchange_rate {
            if rate <= Decimal::ZERO {
                return Err(ActivityError::invalid_data(
                    &self.id,
                    format!("exchange rate must be positive, got {}", rate),
                ));
            }
        }
        let in_range = self.amount.checked_add(self.fee_amt()).is_some()
            && self
                .amount
                .checked_mul(self.exchange_rate.unwrap_or(Decimal::ONE))
                .is_some();
        if !in_range {
            return Err(ActivityError::invalid_data(
                &self.id,
                format!("amount {} is out of range", self.amount),
            ));
        }
        Ok(())
    }

    pub fn is_transfer_with_target(&self) -> bool {
        self.flow_type == CashFlowType::Transfer && self.target_account_id.is_some()
    }

    /// Total debited from the source account by an outflow (amount + fee).
    pub fn source_amount(&self) -> Decimal {
        self.amount + self.fee_amt()
    }

    /// Signed effect on this flow's own account.
    pub fn cash_effect(&self) -> Decimal {
        match self.flow_type {
            CashFlowType::Deposit | CashFlowType::Interest => self.amount - self.fee_amt(),
            CashFlowType::Withdraw | CashFlowType::Transfer => -self.source_amount(),
        }
    }

    /// Amount credited to the receiving account of a transfer.
    pub fn target_amount(&self) -> Decimal {
        self.amount * self.exchange_rate.unwrap_or(Decimal::ONE)
    }
}
