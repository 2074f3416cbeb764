pub mod error;
pub mod inputs;
pub mod line_items;
pub mod presenter;
pub mod statements;
pub mod types;

pub use error::StatementError;
pub use types::*;

/// Standard result type for all statement operations
pub type StatementResult<T> = Result<T, StatementError>;
