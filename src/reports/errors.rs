//! Report error types

use thiserror::Error;

use crate::store::StoreError;

/// Result type for report computations
pub type ReportResult<T> = Result<T, ReportError>;

/// Report failures, always server-side
#[derive(Debug, Error)]
pub enum ReportError {
    /// Scan or connection failure
    #[error(transparent)]
    Store(#[from] StoreError),
}
