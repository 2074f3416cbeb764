use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatementError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unbalanced statement: assets differ from liabilities plus equity by {diff}")]
    UnbalancedStatement { diff: Decimal },

    #[error("Duplicate line item '{name}' in section {section}")]
    DuplicateLineItem { section: String, name: String },

    #[error("Section {section} has no total line")]
    MissingTotal { section: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for StatementError {
    fn from(e: serde_json::Error) -> Self {
        StatementError::SerializationError(e.to_string())
    }
}
