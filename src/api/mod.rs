//! HTTP API
//!
//! Thin axum surface over the synchronous core: parse the request, hand it
//! to the pipeline on a blocking thread, format the response envelope.
//! Responses carry aggregate counts only; per-row diagnostic detail lives
//! solely in the rejection log.

mod errors;
mod request;
mod response;
mod server;

pub use errors::{ApiError, ApiResult};
pub use request::{ExportRequest, IngestRequest, ReportParams, RestoreRequest};
pub use response::{Envelope, Metadata};
pub use server::{router, serve};

use std::path::PathBuf;
use std::sync::Arc;

use crate::blob::BlobStore;
use crate::ingest::Ingestor;
use crate::restore::Restorer;
use crate::schema::SchemaRegistry;
use crate::snapshot::SnapshotWriter;
use crate::store::SqlConnector;

/// Service wiring options
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Dataset name used in snapshot paths
    pub dataset: String,
    /// Directory for rejection logs
    pub log_dir: PathBuf,
    /// Maximum rows per ingestion batch
    pub max_batch_rows: usize,
}

/// Shared state behind the router: the three pipelines plus the raw
/// collaborators the report endpoints scan through.
pub struct ServiceState {
    pub ingestor: Ingestor,
    pub exporter: SnapshotWriter,
    pub restorer: Restorer,
    pub connector: Arc<dyn SqlConnector>,
}

impl ServiceState {
    /// Wire the service from its collaborators
    pub fn new(
        registry: SchemaRegistry,
        connector: Arc<dyn SqlConnector>,
        blob: Arc<dyn BlobStore>,
        options: ServiceOptions,
    ) -> Self {
        let registry = Arc::new(registry);
        Self {
            ingestor: Ingestor::new(
                Arc::clone(&registry),
                Arc::clone(&connector),
                options.log_dir,
                options.max_batch_rows,
            ),
            exporter: SnapshotWriter::new(
                Arc::clone(&registry),
                Arc::clone(&connector),
                Arc::clone(&blob),
                options.dataset,
            ),
            restorer: Restorer::new(Arc::clone(&registry), Arc::clone(&connector), blob),
            connector,
        }
    }
}
