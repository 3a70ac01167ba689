//! Portfolio module - holdings, summary, yearly history and the
//! recomputation service tying them together.

pub mod history;
pub mod holdings;
mod portfolio_model;
mod portfolio_service;
pub mod summary;

pub use portfolio_model::{PortfolioBook, PortfolioSnapshot};
pub use portfolio_service::PortfolioService;

#[cfg(test)]
mod portfolio_service_tests;
