//! Batch ingestion pipeline
//!
//! One call wires the whole inbound path: resolve the table's schema,
//! shape-check the batch, partition rows into accepted and rejected, log
//! every rejection, then bulk-insert the accepted set as one transaction.
//!
//! Rejection logging precedes the insert, so rejection evidence survives
//! even when the subsequent insert fails and rolls back.

mod diagnostics;
mod errors;

pub use diagnostics::RejectionLog;
pub use errors::{IngestError, IngestResult};

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::observability::Logger;
use crate::schema::SchemaRegistry;
use crate::store::{insert_batch, SqlConnector};
use crate::validate::{partition, Batch};

/// Aggregate outcome of one ingestion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Rows inserted and committed
    pub inserted: usize,
    /// Rows rejected by validation (details in the rejection log)
    pub rejected: usize,
}

/// The validation-partition-insert pipeline
pub struct Ingestor {
    registry: Arc<SchemaRegistry>,
    connector: Arc<dyn SqlConnector>,
    log_dir: PathBuf,
    max_batch_rows: usize,
}

impl Ingestor {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        connector: Arc<dyn SqlConnector>,
        log_dir: impl Into<PathBuf>,
        max_batch_rows: usize,
    ) -> Self {
        Self {
            registry,
            connector,
            log_dir: log_dir.into(),
            max_batch_rows,
        }
    }

    /// Ingest one batch into `table`.
    ///
    /// Row-level findings never fail the call; they are counted in the
    /// report and written to the rejection log. Only unknown tables,
    /// malformed batches, diagnostics failures, and store failures are
    /// errors.
    pub fn ingest(&self, table: &str, payload: &Value) -> IngestResult<IngestReport> {
        let schema = self.registry.resolve(table)?;
        let batch = Batch::from_value(payload, self.max_batch_rows)?;
        let run_id = Uuid::new_v4();

        let report = partition(&batch, &schema);

        if !report.rejected.is_empty() {
            let mut sink = RejectionLog::create(&self.log_dir, table, run_id)?;
            for rejected in &report.rejected {
                sink.record(rejected)?;
            }
            let log_path = sink.path().display().to_string();
            Logger::warn(
                "INGEST_ROWS_REJECTED",
                &[
                    ("table", table),
                    ("rejected", &report.rejected.len().to_string()),
                    ("log", &log_path),
                ],
            );
        }

        let mut conn = self.connector.connect()?;
        let inserted = insert_batch(conn.as_mut(), &schema, &report.accepted)?;

        Logger::info(
            "INGEST_COMPLETE",
            &[
                ("table", table),
                ("inserted", &inserted.to_string()),
                ("rejected", &report.rejected.len().to_string()),
                ("run_id", &run_id.simple().to_string()),
            ],
        );

        Ok(IngestReport {
            inserted,
            rejected: report.rejected.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, SqlValue, TableSpec};
    use serde_json::json;
    use tempfile::TempDir;

    fn ingestor_with(store: &InMemoryStore, log_dir: &std::path::Path) -> Ingestor {
        Ingestor::new(
            Arc::new(SchemaRegistry::builtin()),
            Arc::new(store.clone()),
            log_dir,
            1000,
        )
    }

    fn jobs_store() -> InMemoryStore {
        let registry = SchemaRegistry::builtin();
        let store = InMemoryStore::new();
        store.create_table(TableSpec::from_schema(&registry.resolve("jobs").unwrap()));
        store
    }

    #[test]
    fn test_clean_batch_inserts_everything() {
        let tmp = TempDir::new().unwrap();
        let store = jobs_store();
        let ingestor = ingestor_with(&store, tmp.path());

        let report = ingestor
            .ingest("jobs", &json!([{"job": "Engineer"}, {"job": "Analyst"}]))
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 2, rejected: 0 });
        assert_eq!(store.rows("jobs").unwrap().len(), 2);
        // No rejections, no log file
        assert!(!tmp.path().join("jobs").exists());
    }

    #[test]
    fn test_mixed_batch_partial_success() {
        let tmp = TempDir::new().unwrap();
        let store = jobs_store();
        let ingestor = ingestor_with(&store, tmp.path());

        let report = ingestor
            .ingest(
                "jobs",
                &json!([{"job": "Engineer"}, {"job": 5}, {"title": "Engineer"}]),
            )
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 1, rejected: 2 });
        assert_eq!(store.rows("jobs").unwrap().len(), 1);

        // Both rejected rows landed in the run's log
        let table_dir = tmp.path().join("jobs");
        let entries: Vec<_> = std::fs::read_dir(&table_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let contents =
            std::fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_fully_rejected_batch_commits_zero() {
        let tmp = TempDir::new().unwrap();
        let store = jobs_store();
        let ingestor = ingestor_with(&store, tmp.path());

        let report = ingestor
            .ingest("jobs", &json!([{"job": 1}, {"job": 2}]))
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 0, rejected: 2 });
        assert_eq!(store.rows("jobs").unwrap().len(), 0);
    }

    #[test]
    fn test_store_failure_preserves_rejection_log() {
        let tmp = TempDir::new().unwrap();
        let registry = SchemaRegistry::builtin();
        let store = InMemoryStore::new();
        store.create_table(
            TableSpec::from_schema(&registry.resolve("jobs").unwrap()).with_unique("job"),
        );
        let ingestor = ingestor_with(&store, tmp.path());

        // Duplicate accepted rows trip the unique constraint: whole insert
        // rolls back, but the rejected row's evidence is already on disk
        let result = ingestor.ingest(
            "jobs",
            &json!([{"job": "Engineer"}, {"job": 5}, {"job": "Engineer"}]),
        );

        assert!(matches!(result, Err(IngestError::Store(_))));
        assert_eq!(store.rows("jobs").unwrap().len(), 0);

        let table_dir = tmp.path().join("jobs");
        let entries: Vec<_> = std::fs::read_dir(&table_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_unknown_table_is_client_error() {
        let tmp = TempDir::new().unwrap();
        let ingestor = ingestor_with(&jobs_store(), tmp.path());

        let err = ingestor
            .ingest("invoices", &json!([{"job": "x"}]))
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_oversized_batch_rejected_before_rows_are_read() {
        let tmp = TempDir::new().unwrap();
        let store = jobs_store();
        let ingestor = Ingestor::new(
            Arc::new(SchemaRegistry::builtin()),
            Arc::new(store.clone()),
            tmp.path(),
            2,
        );

        let err = ingestor
            .ingest("jobs", &json!([{"job": "a"}, {"job": "b"}, {"job": "c"}]))
            .unwrap_err();

        assert!(err.is_client_error());
        assert_eq!(store.rows("jobs").unwrap().len(), 0);
    }

    #[test]
    fn test_seeded_identity_continues() {
        let tmp = TempDir::new().unwrap();
        let store = jobs_store();
        store
            .seed_row("jobs", vec![SqlValue::Int(41), SqlValue::Text("CEO".into())])
            .unwrap();
        let ingestor = ingestor_with(&store, tmp.path());

        ingestor.ingest("jobs", &json!([{"job": "Intern"}])).unwrap();

        let rows = store.rows("jobs").unwrap();
        assert_eq!(rows[1][0], SqlValue::Int(42));
    }
}
