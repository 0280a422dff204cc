//! Store value model
//!
//! [`SqlValue`] is the typed bridge between JSON rows and store parameters,
//! and between store scans and snapshot records. `Bytes` and `Timestamp`
//! only ever arrive from scans; inbound JSON never produces them.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A single store cell value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Returns the value kind for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Int(_) => "int",
            SqlValue::Float(_) => "float",
            SqlValue::Bool(_) => "bool",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }

    /// Convert a scalar JSON value into a store value.
    ///
    /// Returns `None` for arrays and objects, which have no store
    /// representation.
    pub fn from_json(value: &Value) -> Option<SqlValue> {
        match value {
            Value::Null => Some(SqlValue::Null),
            Value::Bool(b) => Some(SqlValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(SqlValue::Int(i))
                } else {
                    n.as_f64().map(SqlValue::Float)
                }
            }
            Value::String(s) => Some(SqlValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// One scanned table row: column names paired with values, in the table's
/// declared column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
    pub columns: Vec<(String, SqlValue)>,
}

impl ScanRow {
    pub fn new(columns: Vec<(String, SqlValue)>) -> Self {
        Self { columns }
    }

    /// Look up a value by column name
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }
}
