//! Snapshot export error types

use thiserror::Error;

use crate::blob::BlobError;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Export failures, fatal to the current export call
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Table not present in the registry
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Scan or connection failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Upload to object storage failed
    #[error("snapshot upload failed: {0}")]
    Upload(#[from] BlobError),

    /// A row could not be encoded under the export schema
    #[error("snapshot encoding failed: {0}")]
    Encode(String),
}
