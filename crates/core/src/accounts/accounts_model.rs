//! Account domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{errors::ValidationError, Error, Result};

/// A brokerage or bank account holding cash in a single currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Currency the account's cash balance is kept in
    pub currency: String,
    /// Cash present before the first recorded entry
    #[serde(default)]
    pub opening_balance: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Account {
    pub fn new(id: &str, name: &str, currency: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            currency: currency.to_string(),
            opening_balance: Decimal::ZERO,
            is_active: true,
        }
    }

    pub fn with_opening_balance(mut self, opening_balance: Decimal) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    /// Validates the account data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account ID cannot be empty".to_string(),
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Currency cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Id-keyed view over the accounts that currently exist.
///
/// Records pointing at an id missing from the index are dangling references
/// and are left out of balance and cost computations.
#[derive(Debug, Clone, Default)]
pub struct AccountIndex<'a> {
    by_id: HashMap<&'a str, &'a Account>,
}

impl<'a> AccountIndex<'a> {
    pub fn new(accounts: &'a [Account]) -> Self {
        let by_id = accounts.iter().map(|a| (a.id.as_str(), a)).collect();
        Self { by_id }
    }

    pub fn get(&self, account_id: &str) -> Option<&'a Account> {
        self.by_id.get(account_id).copied()
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.by_id.contains_key(account_id)
    }

    pub fn currency_of(&self, account_id: &str) -> Option<&'a str> {
        self.get(account_id).map(|a| a.currency.as_str())
    }

    pub fn opening_balance(&self, account_id: &str) -> Decimal {
        self.get(account_id)
            .map(|a| a.opening_balance)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &'a Account> + '_ {
        self.by_id.values().copied()
    }
}
