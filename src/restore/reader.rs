//! Snapshot decoding
//!
//! Decodes a Parquet snapshot into records, column by column, under the
//! table's registered export schema. All records are materialized in
//! memory; snapshots are table-sized, not stream-sized.

use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value};

use crate::schema::{ExportField, ExportKind};

use super::errors::{RestoreError, RestoreResult};

/// Decode snapshot bytes into one record per row.
///
/// Every export-schema field must be present in the snapshot with the
/// expected physical type; nulls are preserved as JSON nulls.
pub fn decode_records(
    bytes: Vec<u8>,
    fields: &[ExportField],
) -> RestoreResult<Vec<Map<String, Value>>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
        .map_err(|e| RestoreError::Decode(format!("parquet reader init failed: {e}")))?
        .build()
        .map_err(|e| RestoreError::Decode(format!("parquet reader build failed: {e}")))?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| RestoreError::Decode(format!("batch read failed: {e}")))?;
        decode_batch(&batch, fields, &mut records)?;
    }
    Ok(records)
}

fn decode_batch(
    batch: &RecordBatch,
    fields: &[ExportField],
    records: &mut Vec<Map<String, Value>>,
) -> RestoreResult<()> {
    let start = records.len();
    for _ in 0..batch.num_rows() {
        records.push(Map::with_capacity(fields.len()));
    }

    for field in fields {
        let index = batch
            .schema()
            .index_of(&field.name)
            .map_err(|_| RestoreError::Decode(format!("missing column '{}'", field.name)))?;
        let column = batch.column(index);

        match field.kind {
            ExportKind::Long => {
                let array = column
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .ok_or_else(|| column_type_error(field))?;
                for row in 0..batch.num_rows() {
                    let value = cell(array.is_null(row), || Value::from(array.value(row)));
                    records[start + row].insert(field.name.clone(), value);
                }
            }
            ExportKind::Str => {
                let array = column
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| column_type_error(field))?;
                for row in 0..batch.num_rows() {
                    let value = cell(array.is_null(row), || Value::from(array.value(row)));
                    records[start + row].insert(field.name.clone(), value);
                }
            }
            ExportKind::Double => {
                let array = column
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| column_type_error(field))?;
                for row in 0..batch.num_rows() {
                    let value = cell(array.is_null(row), || Value::from(array.value(row)));
                    records[start + row].insert(field.name.clone(), value);
                }
            }
            ExportKind::Boolean => {
                let array = column
                    .as_any()
                    .downcast_ref::<BooleanArray>()
                    .ok_or_else(|| column_type_error(field))?;
                for row in 0..batch.num_rows() {
                    let value = cell(array.is_null(row), || Value::from(array.value(row)));
                    records[start + row].insert(field.name.clone(), value);
                }
            }
        }
    }

    Ok(())
}

fn cell(is_null: bool, value: impl FnOnce() -> Value) -> Value {
    if is_null {
        Value::Null
    } else {
        value()
    }
}

fn column_type_error(field: &ExportField) -> RestoreError {
    RestoreError::Decode(format!(
        "column '{}' does not have the expected physical type",
        field.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ExportField;

    #[test]
    fn test_garbage_bytes_fail_decoding() {
        let fields = [ExportField::new("id", ExportKind::Long, false)];
        let err = decode_records(b"not parquet".to_vec(), &fields).unwrap_err();
        assert!(matches!(err, RestoreError::Decode(_)));
    }
}
