//! API request types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Batch ingestion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Destination table; must resolve in the registry
    pub table_name: String,
    /// The batch payload; must be a non-empty array within the size bound
    pub rows: Value,
}

/// Table export request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub table_name: String,
}

/// Table restore request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreRequest {
    pub table_name: String,
    /// Object-store path of the snapshot to restore from
    pub snapshot_path: String,
}

/// Query parameters for the report endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReportParams {
    pub year: i32,
}
