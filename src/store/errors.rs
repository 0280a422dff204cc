//! Store error types
//!
//! Every variant is fatal to the operation that hit it: the in-flight
//! transaction must be rolled back and the error surfaced to the caller.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store unreachable or session broken
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Statement referenced a table the store does not have
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    /// Statement referenced a column the table does not have
    #[error("unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Row arity does not match the statement's column list
    #[error("statement for '{table}' has {expected} columns, row has {actual} values")]
    ColumnMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// Write rejected by a table constraint
    #[error("constraint violation on '{table}.{column}': {reason}")]
    ConstraintViolation {
        table: String,
        column: String,
        reason: String,
    },

    /// A value could not be bound to a statement parameter
    #[error("value for column '{column}' is not storable: {detail}")]
    UnsupportedValue { column: String, detail: String },
}
