//! Accounts module - domain models and lookup helpers.

mod accounts_model;

#[cfg(test)]
mod accounts_model_tests;

pub use accounts_model::{Account, AccountIndex};
