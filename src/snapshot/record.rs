//! Snapshot record flattening
//!
//! Conversion rules for every scanned row, applied before encoding:
//! - column names are lower-cased
//! - binary values decode as UTF-8 text
//! - timestamp values become integer epoch-milliseconds
//! - other scalars pass through, nulls are preserved

use serde_json::{Map, Number, Value};

use crate::store::{ScanRow, SqlValue};

use super::errors::{SnapshotError, SnapshotResult};

/// Flatten one scanned row into a snapshot record
pub fn flatten_row(row: &ScanRow) -> SnapshotResult<Map<String, Value>> {
    let mut record = Map::with_capacity(row.columns.len());

    for (name, value) in &row.columns {
        let converted = match value {
            SqlValue::Null => Value::Null,
            SqlValue::Int(i) => Value::from(*i),
            SqlValue::Float(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
                SnapshotError::Encode(format!("field '{}' holds a non-finite float", name))
            })?,
            SqlValue::Bool(b) => Value::from(*b),
            SqlValue::Text(s) => Value::from(s.clone()),
            SqlValue::Bytes(bytes) => {
                let text = String::from_utf8(bytes.clone()).map_err(|_| {
                    SnapshotError::Encode(format!("field '{}' is not valid UTF-8", name))
                })?;
                Value::from(text)
            }
            SqlValue::Timestamp(ts) => Value::from(ts.timestamp_millis()),
        };
        record.insert(name.to_lowercase(), converted);
    }

    Ok(record)
}
