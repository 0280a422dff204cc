//! Ingestion error types
//!
//! Row-level findings are never errors; they are data carried in the
//! validation report and the rejection log. These variants are the fatal
//! classes only.

use thiserror::Error;

use crate::schema::SchemaError;
use crate::store::StoreError;
use crate::validate::BatchError;

/// Result type for ingestion
pub type IngestResult<T> = Result<T, IngestError>;

/// Fatal ingestion failures
#[derive(Debug, Error)]
pub enum IngestError {
    /// Unknown table identifier
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Batch failed the shape preconditions
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Store connection or write failure; the accepted set was rolled back
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The rejection log could not be written
    #[error("failed to write rejection diagnostics: {0}")]
    Diagnostics(#[from] std::io::Error),
}

impl IngestError {
    /// Whether the failure is the caller's fault (malformed request) rather
    /// than the service's
    pub fn is_client_error(&self) -> bool {
        matches!(self, IngestError::Schema(_) | IngestError::Batch(_))
    }
}
