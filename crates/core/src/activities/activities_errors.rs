use thiserror::Error;

/// A Transaction or CashFlow record that cannot take part in a calculation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActivityError {
    #[error("Invalid date '{value}' on record {record_id}")]
    InvalidDate { record_id: String, value: String },
    #[error("Invalid data on record {record_id}: {message}")]
    InvalidData { record_id: String, message: String },
    #[error("Record {record_id} references unknown account {account_id}")]
    UnknownAccount {
        record_id: String,
        account_id: String,
    },
}

impl ActivityError {
    pub fn invalid_data(record_id: &str, message: impl Into<String>) -> Self {
        ActivityError::InvalidData {
            record_id: record_id.to_string(),
            message: message.into(),
        }
    }
}
