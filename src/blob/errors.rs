//! Object store error types

use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Object store failures, always fatal to the current operation
#[derive(Debug, Error)]
pub enum BlobError {
    /// No blob at the requested path
    #[error("blob not found at '{0}'")]
    NotFound(String),

    /// Transport or service failure
    #[error("object store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_path() {
        let err = BlobError::NotFound("backup/jobs/jobs_x.parquet".into());
        assert!(format!("{}", err).contains("jobs_x.parquet"));
    }
}
