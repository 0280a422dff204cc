//! Snapshot writer
//!
//! Full scan, flatten, encode as one in-memory Parquet buffer, upload.
//! The buffer's CRC32 is computed before upload and reported alongside the
//! path so operators can verify the stored object.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::blob::BlobStore;
use crate::observability::Logger;
use crate::schema::{ExportField, ExportKind, TableSchema};
use crate::store::SqlConnector;

use super::errors::{SnapshotError, SnapshotResult};
use super::record::flatten_row;

/// Result of one export call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A snapshot object was written
    Written {
        /// Object path within the container
        path: String,
        /// Number of exported records
        rows: usize,
        /// CRC32 of the uploaded bytes
        checksum: u32,
    },
    /// The table held zero rows; nothing was uploaded
    NothingToExport,
}

/// Exports full tables to Parquet snapshots in object storage
pub struct SnapshotWriter {
    registry: Arc<crate::schema::SchemaRegistry>,
    connector: Arc<dyn SqlConnector>,
    blob: Arc<dyn BlobStore>,
    dataset: String,
}

impl SnapshotWriter {
    pub fn new(
        registry: Arc<crate::schema::SchemaRegistry>,
        connector: Arc<dyn SqlConnector>,
        blob: Arc<dyn BlobStore>,
        dataset: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            connector,
            blob,
            dataset: dataset.into(),
        }
    }

    /// Export the full contents of `table`.
    ///
    /// # Errors
    ///
    /// Fails on unknown tables, scan/connection failures, rows that do not
    /// fit the export schema, and upload failures. An empty table is not an
    /// error; it returns [`ExportOutcome::NothingToExport`].
    pub fn export_table(&self, table: &str) -> SnapshotResult<ExportOutcome> {
        let schema = self.registry.resolve(table)?;

        let mut conn = self.connector.connect()?;
        let scanned = conn.scan_table(table)?;

        if scanned.is_empty() {
            Logger::warn("EXPORT_EMPTY", &[("table", table)]);
            return Ok(ExportOutcome::NothingToExport);
        }

        let mut records = Vec::with_capacity(scanned.len());
        for row in &scanned {
            records.push(flatten_row(row)?);
        }

        let buffer = encode_parquet(&schema, &records)?;
        let checksum = crc32fast::hash(&buffer);

        let run_id = Uuid::new_v4();
        let path = format!(
            "{}/{}/{}_{}.parquet",
            self.dataset,
            table,
            table,
            run_id.simple()
        );
        self.blob.put(&path, &buffer)?;

        Logger::info(
            "EXPORT_COMPLETE",
            &[
                ("table", table),
                ("path", &path),
                ("rows", &records.len().to_string()),
                ("crc32", &format!("{:08x}", checksum)),
            ],
        );

        Ok(ExportOutcome::Written {
            path,
            rows: records.len(),
            checksum,
        })
    }
}

/// Encode records into one Parquet buffer under the table's export schema
fn encode_parquet(schema: &TableSchema, records: &[Map<String, Value>]) -> SnapshotResult<Vec<u8>> {
    let arrow_schema = Arc::new(arrow_schema_for(schema));

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.export_fields.len());
    for field in &schema.export_fields {
        columns.push(column_array(field, records)?);
    }

    let batch = RecordBatch::try_new(arrow_schema.clone(), columns)
        .map_err(|e| SnapshotError::Encode(format!("record batch build failed: {e}")))?;

    let props = WriterProperties::builder()
        .set_key_value_metadata(Some(vec![KeyValue {
            key: "created_by".to_string(),
            value: Some("rowdock".to_string()),
        }]))
        .build();

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, arrow_schema, Some(props))
        .map_err(|e| SnapshotError::Encode(format!("parquet writer init failed: {e}")))?;
    writer
        .write(&batch)
        .map_err(|e| SnapshotError::Encode(format!("parquet write failed: {e}")))?;
    writer
        .close()
        .map_err(|e| SnapshotError::Encode(format!("parquet close failed: {e}")))?;

    Ok(buffer)
}

fn arrow_schema_for(schema: &TableSchema) -> ArrowSchema {
    let fields: Vec<Field> = schema
        .export_fields
        .iter()
        .map(|f| {
            let data_type = match f.kind {
                ExportKind::Long => DataType::Int64,
                ExportKind::Str => DataType::Utf8,
                ExportKind::Double => DataType::Float64,
                ExportKind::Boolean => DataType::Boolean,
            };
            Field::new(&f.name, data_type, f.nullable)
        })
        .collect();
    ArrowSchema::new(fields)
}

fn column_array(field: &ExportField, records: &[Map<String, Value>]) -> SnapshotResult<ArrayRef> {
    match field.kind {
        ExportKind::Long => {
            let values = collect_column(field, records, |v| v.as_i64())?;
            Ok(Arc::new(Int64Array::from(values)))
        }
        ExportKind::Str => {
            let values = collect_column(field, records, |v| v.as_str().map(str::to_owned))?;
            Ok(Arc::new(StringArray::from(values)))
        }
        ExportKind::Double => {
            let values = collect_column(field, records, |v| v.as_f64())?;
            Ok(Arc::new(Float64Array::from(values)))
        }
        ExportKind::Boolean => {
            let values = collect_column(field, records, |v| v.as_bool())?;
            Ok(Arc::new(BooleanArray::from(values)))
        }
    }
}

fn collect_column<T>(
    field: &ExportField,
    records: &[Map<String, Value>],
    extract: impl Fn(&Value) -> Option<T>,
) -> SnapshotResult<Vec<Option<T>>> {
    let mut values = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let value = record.get(&field.name).unwrap_or(&Value::Null);
        if value.is_null() {
            if !field.nullable {
                return Err(SnapshotError::Encode(format!(
                    "record {} has no value for non-nullable field '{}'",
                    index, field.name
                )));
            }
            values.push(None);
            continue;
        }

        match extract(value) {
            Some(v) => values.push(Some(v)),
            None => {
                return Err(SnapshotError::Encode(format!(
                    "record {} field '{}' does not match the export schema",
                    index, field.name
                )));
            }
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::InMemoryBlobStore;
    use crate::schema::SchemaRegistry;
    use crate::store::{InMemoryStore, SqlValue, TableSpec};
    use chrono::{TimeZone, Utc};

    fn writer_over(
        store: InMemoryStore,
        blob: InMemoryBlobStore,
    ) -> SnapshotWriter {
        SnapshotWriter::new(
            Arc::new(SchemaRegistry::builtin()),
            Arc::new(store),
            Arc::new(blob),
            "migration_tables",
        )
    }

    fn jobs_store() -> InMemoryStore {
        let registry = SchemaRegistry::builtin();
        let store = InMemoryStore::new();
        store.create_table(TableSpec::from_schema(&registry.resolve("jobs").unwrap()));
        store
    }

    #[test]
    fn test_empty_table_uploads_nothing() {
        let store = jobs_store();
        let blob = InMemoryBlobStore::new();
        let writer = writer_over(store, blob.clone());

        let outcome = writer.export_table("jobs").unwrap();

        assert_eq!(outcome, ExportOutcome::NothingToExport);
        assert!(blob.is_empty());
    }

    #[test]
    fn test_export_writes_parquet_at_run_scoped_path() {
        let store = jobs_store();
        store
            .seed_row("jobs", vec![SqlValue::Int(1), SqlValue::Text("Engineer".into())])
            .unwrap();
        let blob = InMemoryBlobStore::new();
        let writer = writer_over(store, blob.clone());

        let outcome = writer.export_table("jobs").unwrap();
        let (path, rows) = match outcome {
            ExportOutcome::Written { path, rows, .. } => (path, rows),
            other => panic!("expected Written, got {:?}", other),
        };

        assert_eq!(rows, 1);
        assert!(path.starts_with("migration_tables/jobs/jobs_"));
        assert!(path.ends_with(".parquet"));

        let bytes = blob.get(&path).unwrap();
        assert_eq!(&bytes[0..4], b"PAR1");
    }

    #[test]
    fn test_repeated_exports_never_collide() {
        let store = jobs_store();
        store
            .seed_row("jobs", vec![SqlValue::Int(1), SqlValue::Text("Engineer".into())])
            .unwrap();
        let blob = InMemoryBlobStore::new();
        let writer = writer_over(store, blob.clone());

        writer.export_table("jobs").unwrap();
        writer.export_table("jobs").unwrap();

        assert_eq!(blob.len(), 2);
    }

    #[test]
    fn test_nulls_bytes_and_timestamps_are_encoded() {
        let registry = SchemaRegistry::builtin();
        let store = InMemoryStore::new();
        store.create_table(TableSpec::from_schema(
            &registry.resolve("hired_employees").unwrap(),
        ));
        let hired = Utc.with_ymd_and_hms(2021, 7, 27, 16, 2, 8).unwrap();
        store
            .seed_row(
                "hired_employees",
                vec![
                    SqlValue::Int(1),
                    SqlValue::Bytes(b"Alice".to_vec()),
                    SqlValue::Text("2021-07-27T16:02:08Z".into()),
                    SqlValue::Null,
                    SqlValue::Int(2),
                ],
            )
            .unwrap();
        // A timestamp value in a Long column flattens to epoch-millis
        store
            .seed_row(
                "hired_employees",
                vec![
                    SqlValue::Int(2),
                    SqlValue::Text("Bob".into()),
                    SqlValue::Text("2021-08-01T09:00:00Z".into()),
                    SqlValue::Timestamp(hired),
                    SqlValue::Int(3),
                ],
            )
            .unwrap();

        let blob = InMemoryBlobStore::new();
        let writer = writer_over(store, blob.clone());

        let outcome = writer.export_table("hired_employees").unwrap();
        assert!(matches!(outcome, ExportOutcome::Written { rows: 2, .. }));
        assert_eq!(blob.len(), 1);
    }

    #[test]
    fn test_unknown_table_fails() {
        let writer = writer_over(InMemoryStore::new(), InMemoryBlobStore::new());
        assert!(matches!(
            writer.export_table("invoices"),
            Err(SnapshotError::Schema(_))
        ));
    }

    #[test]
    fn test_checksum_matches_uploaded_bytes() {
        let store = jobs_store();
        store
            .seed_row("jobs", vec![SqlValue::Int(1), SqlValue::Text("Engineer".into())])
            .unwrap();
        let blob = InMemoryBlobStore::new();
        let writer = writer_over(store, blob.clone());

        let outcome = writer.export_table("jobs").unwrap();
        if let ExportOutcome::Written { path, checksum, .. } = outcome {
            let bytes = blob.get(&path).unwrap();
            assert_eq!(checksum, crc32fast::hash(&bytes));
        } else {
            panic!("expected Written");
        }
    }
}
