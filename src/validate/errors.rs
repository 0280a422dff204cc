//! Batch shape errors
//!
//! These are fatal to the whole request, unlike row-level findings which
//! are data ([`super::RejectedRow`]) and never raise.

use thiserror::Error;

/// Fatal batch-shape violations, detected before any row is inspected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// The payload under `rows` was not an array
    #[error("batch payload must be an array of records, found {0}")]
    NotASequence(&'static str),

    /// The batch contained no rows
    #[error("batch contains no rows")]
    Empty,

    /// The batch exceeded the configured size bound
    #[error("batch has {len} rows, limit is {max}")]
    Oversized { len: usize, max: usize },
}
