//! Table restorer
//!
//! Drives one restore run: download, decode, truncate, then reinsert each
//! record in its own transaction.

use std::sync::Arc;

use serde_json::Value;

use crate::blob::BlobStore;
use crate::observability::Logger;
use crate::schema::SchemaRegistry;
use crate::store::{InsertStatement, SqlConnection, SqlConnector, SqlValue};

use super::errors::{RestoreError, RestorePhase, RestoreResult};
use super::reader::decode_records;

/// One record that could not be reinserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Index of the record within the snapshot
    pub index: usize,
    /// Store-reported reason
    pub reason: String,
}

/// Outcome of one restore run
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    /// Number of records reinserted and committed
    pub inserted: usize,
    /// Records that were skipped, with reasons
    pub failures: Vec<RowFailure>,
}

impl RestoreReport {
    /// Total number of records processed
    pub fn total(&self) -> usize {
        self.inserted + self.failures.len()
    }
}

/// Rebuilds tables from snapshots
pub struct Restorer {
    registry: Arc<SchemaRegistry>,
    connector: Arc<dyn SqlConnector>,
    blob: Arc<dyn BlobStore>,
}

impl Restorer {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        connector: Arc<dyn SqlConnector>,
        blob: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            registry,
            connector,
            blob,
        }
    }

    /// Restore `table` from the snapshot at `snapshot_path`.
    ///
    /// The destination table holds zero pre-existing rows before the first
    /// record is inserted. Each record is committed or rolled back on its
    /// own, so one bad record costs exactly one row.
    ///
    /// # Errors
    ///
    /// Download, decode, connection, and truncate failures are fatal.
    /// Per-record insert failures are not; they land in the report.
    pub fn restore_table(&self, table: &str, snapshot_path: &str) -> RestoreResult<RestoreReport> {
        let schema = self.registry.resolve(table)?;

        log_phase(table, RestorePhase::Downloading);
        let bytes = self
            .blob
            .get(snapshot_path)
            .map_err(|source| RestoreError::Download {
                path: snapshot_path.to_string(),
                source,
            })?;

        log_phase(table, RestorePhase::Decoding);
        let records = decode_records(bytes, &schema.export_fields)?;

        let fields = schema.restorable_fields();
        let columns: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
        let statement = InsertStatement::new(table, &columns);

        let mut conn = self.connector.connect().map_err(RestoreError::Connect)?;

        log_phase(table, RestorePhase::Truncating);
        if let Err(source) = truncate_and_commit(conn.as_mut(), table) {
            log_phase(table, RestorePhase::Failed);
            return Err(RestoreError::Truncate {
                table: table.to_string(),
                source,
            });
        }

        log_phase(table, RestorePhase::Inserting);
        let mut report = RestoreReport::default();
        for (index, record) in records.iter().enumerate() {
            let row: Vec<SqlValue> = columns
                .iter()
                .map(|column| {
                    let value = record.get(column).unwrap_or(&Value::Null);
                    SqlValue::from_json(value).unwrap_or(SqlValue::Null)
                })
                .collect();

            let outcome = match conn.execute_insert(&statement, std::slice::from_ref(&row)) {
                Ok(()) => conn.commit(),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(()) => report.inserted += 1,
                Err(err) => {
                    let _ = conn.rollback();
                    let reason = err.to_string();
                    Logger::warn(
                        "RESTORE_ROW_FAILED",
                        &[
                            ("table", table),
                            ("index", &index.to_string()),
                            ("reason", &reason),
                        ],
                    );
                    report.failures.push(RowFailure { index, reason });
                }
            }
        }

        log_phase(table, RestorePhase::Done);
        Logger::info(
            "RESTORE_COMPLETE",
            &[
                ("table", table),
                ("inserted", &report.inserted.to_string()),
                ("failed", &report.failures.len().to_string()),
            ],
        );

        Ok(report)
    }
}

fn truncate_and_commit(
    conn: &mut dyn SqlConnection,
    table: &str,
) -> Result<(), crate::store::StoreError> {
    if let Err(err) = conn.truncate_table(table) {
        let _ = conn.rollback();
        return Err(err);
    }
    conn.commit()
}

fn log_phase(table: &str, phase: RestorePhase) {
    Logger::info("RESTORE_PHASE", &[("table", table), ("phase", phase.as_str())]);
}
