//! Activities module - the two independently entered record streams:
//! security transactions and cash flows.

mod activities_constants;
mod activities_errors;
mod activities_model;


pub use activities_constants::*;
pub use activities_errors::ActivityError;
pub use activities_model::{
    parse_record_date, CashFlow, CashFlowType, Transaction, TransactionType,
};
