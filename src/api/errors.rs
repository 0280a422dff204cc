//! API error mapping
//!
//! Client-caused failures (unknown table, malformed batch) answer 400;
//! everything else is a server-side 500. The body is always the error
//! envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::ingest::IngestError;
use crate::reports::ReportError;
use crate::restore::RestoreError;
use crate::snapshot::SnapshotError;

use super::response::Envelope;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Restore(#[from] RestoreError),

    #[error(transparent)]
    Report(#[from] ReportError),

    /// Blocking-task execution failure
    #[error("internal task failure: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ingest(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Snapshot(SnapshotError::Schema(_)) => StatusCode::BAD_REQUEST,
            ApiError::Restore(RestoreError::Schema(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let envelope = Envelope::error(self.to_string());
        (status, Json(envelope)).into_response()
    }
}
