//! Restore error types and phase tracking

use std::fmt;

use thiserror::Error;

use crate::blob::BlobError;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// Result type for restore operations
pub type RestoreResult<T> = Result<T, RestoreError>;

/// Phases of one restore run.
///
/// `Downloading`, `Decoding`, and `Truncating` failures are fatal and
/// transition to `Failed`. `Inserting` failures are row-granular and never
/// fail the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    Idle,
    Downloading,
    Decoding,
    Truncating,
    Inserting,
    Done,
    Failed,
}

impl RestorePhase {
    /// Returns the phase name for log events
    pub fn as_str(&self) -> &'static str {
        match self {
            RestorePhase::Idle => "IDLE",
            RestorePhase::Downloading => "DOWNLOADING",
            RestorePhase::Decoding => "DECODING",
            RestorePhase::Truncating => "TRUNCATING",
            RestorePhase::Inserting => "INSERTING",
            RestorePhase::Done => "DONE",
            RestorePhase::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fatal restore failures
#[derive(Debug, Error)]
pub enum RestoreError {
    /// Table not present in the registry
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Snapshot could not be fetched from object storage
    #[error("snapshot download failed at '{path}': {source}")]
    Download { path: String, source: BlobError },

    /// Snapshot bytes could not be decoded into records
    #[error("snapshot decode failed: {0}")]
    Decode(String),

    /// Store connection could not be opened
    #[error("store connection failed: {0}")]
    Connect(StoreError),

    /// Truncate of the destination table failed; nothing was inserted
    #[error("truncate of '{table}' failed: {source}")]
    Truncate { table: String, source: StoreError },
}

impl RestoreError {
    /// The phase the run was in when it failed
    pub fn phase(&self) -> RestorePhase {
        match self {
            RestoreError::Schema(_) => RestorePhase::Idle,
            RestoreError::Download { .. } => RestorePhase::Downloading,
            RestoreError::Decode(_) => RestorePhase::Decoding,
            RestoreError::Connect(_) | RestoreError::Truncate { .. } => RestorePhase::Truncating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_phases() {
        let err = RestoreError::Download {
            path: "p".into(),
            source: BlobError::NotFound("p".into()),
        };
        assert_eq!(err.phase(), RestorePhase::Downloading);

        let err = RestoreError::Decode("bad magic".into());
        assert_eq!(err.phase(), RestorePhase::Decoding);

        let err = RestoreError::Truncate {
            table: "jobs".into(),
            source: StoreError::Unavailable("down".into()),
        };
        assert_eq!(err.phase(), RestorePhase::Truncating);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(RestorePhase::Downloading.as_str(), "DOWNLOADING");
        assert_eq!(RestorePhase::Done.as_str(), "DONE");
    }
}
