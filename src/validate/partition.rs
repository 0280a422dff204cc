//! Row validation and accept/reject partitioning
//!
//! `partition` walks a batch in index order and splits it into accepted
//! rows and rejected rows with reasons. The partition is total and stable:
//! `accepted.len() + rejected.len() == batch.len()` and relative order
//! within each output matches the input.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::schema::{FieldCheck, FieldType, TableSchema};

use super::datetime::is_iso_datetime;
use super::errors::BatchError;

/// A shape-checked batch of raw rows.
///
/// Construction enforces the fatal preconditions (array, non-empty, within
/// the size bound) before any row is inspected.
#[derive(Debug, Clone)]
pub struct Batch {
    rows: Vec<Value>,
}

impl Batch {
    /// Build a batch from an untrusted JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] if the payload is not an array, is empty, or
    /// exceeds `max_rows`.
    pub fn from_value(payload: &Value, max_rows: usize) -> Result<Self, BatchError> {
        let rows = payload
            .as_array()
            .ok_or_else(|| BatchError::NotASequence(json_type_name(payload)))?;

        if rows.is_empty() {
            return Err(BatchError::Empty);
        }
        if rows.len() > max_rows {
            return Err(BatchError::Oversized {
                len: rows.len(),
                max: max_rows,
            });
        }

        Ok(Self { rows: rows.clone() })
    }

    /// Number of rows in the batch
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch is empty (never true for a constructed batch)
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The raw rows, in submission order
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }
}

/// A row that failed one or more schema checks.
///
/// Serializes to the rejection-log line format:
/// `{"index":…,"row_data":…,"reason":[…]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    /// Index of the row in the original batch
    pub index: usize,
    /// Original row content, unmodified
    #[serde(rename = "row_data")]
    pub row: Value,
    /// Human-readable reasons, at least one
    #[serde(rename = "reason")]
    pub reasons: Vec<String>,
}

/// Disjoint partition of a batch into accepted and rejected rows
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Rows that passed every check, in original order
    pub accepted: Vec<Map<String, Value>>,
    /// Rows that failed at least one check, in original order
    pub rejected: Vec<RejectedRow>,
}

/// Validate every row of a batch against a schema.
///
/// Per row, in index order:
/// 1. Non-object rows are rejected outright; remaining checks are skipped.
/// 2. The row's key set must equal the schema's exactly; missing and extra
///    keys are reported as separate reasons, each sorted and comma-joined.
/// 3. Values of keys present in both are type-checked strictly.
/// 4. Fields with an extra check run it only if the type check passed.
///
/// No row-level failure aborts processing of subsequent rows.
pub fn partition(batch: &Batch, schema: &TableSchema) -> ValidationReport {
    let expected: BTreeSet<&str> = schema.field_names().collect();
    let mut report = ValidationReport::default();

    for (index, row) in batch.rows().iter().enumerate() {
        let record = match row.as_object() {
            Some(record) => record,
            None => {
                report.rejected.push(RejectedRow {
                    index,
                    row: row.clone(),
                    reasons: vec![format!(
                        "row is not a record, it is of type '{}'",
                        json_type_name(row)
                    )],
                });
                continue;
            }
        };

        let mut reasons = Vec::new();
        let present: BTreeSet<&str> = record.keys().map(|k| k.as_str()).collect();

        let missing: Vec<&str> = expected.difference(&present).copied().collect();
        if !missing.is_empty() {
            reasons.push(format!("missing keys: {}", missing.join(", ")));
        }

        let extra: Vec<&str> = present.difference(&expected).copied().collect();
        if !extra.is_empty() {
            reasons.push(format!("unexpected keys: {}", extra.join(", ")));
        }

        for (name, def) in &schema.fields {
            let value = match record.get(name) {
                Some(value) => value,
                None => continue,
            };

            if !type_matches(value, def.field_type) {
                reasons.push(format!(
                    "field '{}' has type '{}', expected '{}'",
                    name,
                    json_type_name(value),
                    def.field_type.type_name()
                ));
                continue;
            }

            if let Some(FieldCheck::IsoDatetime) = def.check {
                let text = value.as_str().unwrap_or_default();
                if !is_iso_datetime(text) {
                    reasons.push(format!(
                        "field '{}' is not a valid ISO 8601 datetime",
                        name
                    ));
                }
            }
        }

        if reasons.is_empty() {
            report.accepted.push(record.clone());
        } else {
            report.rejected.push(RejectedRow {
                index,
                row: row.clone(),
                reasons,
            });
        }
    }

    report
}

/// Strict runtime type check: no coercion between int and float, and bool
/// is never an int.
fn type_matches(value: &Value, expected: FieldType) -> bool {
    match expected {
        FieldType::String => value.is_string(),
        FieldType::Int => value.is_i64() || value.is_u64(),
        FieldType::Float => value.is_f64(),
        FieldType::Bool => value.is_boolean(),
    }
}

/// Returns the JSON type name for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use serde_json::json;
    use std::sync::Arc;

    fn jobs_schema() -> Arc<TableSchema> {
        SchemaRegistry::builtin().resolve("jobs").unwrap()
    }

    fn hired_schema() -> Arc<TableSchema> {
        SchemaRegistry::builtin().resolve("hired_employees").unwrap()
    }

    fn batch_of(rows: Value) -> Batch {
        Batch::from_value(&rows, 1000).unwrap()
    }

    #[test]
    fn test_batch_must_be_array() {
        let err = Batch::from_value(&json!({"job": "x"}), 10).unwrap_err();
        assert_eq!(err, BatchError::NotASequence("object"));
    }

    #[test]
    fn test_batch_must_be_non_empty() {
        let err = Batch::from_value(&json!([]), 10).unwrap_err();
        assert_eq!(err, BatchError::Empty);
    }

    #[test]
    fn test_batch_size_bound() {
        let rows: Vec<Value> = (0..11).map(|_| json!({"job": "x"})).collect();
        let err = Batch::from_value(&Value::Array(rows), 10).unwrap_err();
        assert_eq!(err, BatchError::Oversized { len: 11, max: 10 });
    }

    #[test]
    fn test_conforming_row_accepted_unmodified() {
        let batch = batch_of(json!([{"job": "Engineer"}]));
        let report = partition(&batch, &jobs_schema());

        assert_eq!(report.rejected.len(), 0);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0]["job"], "Engineer");
    }

    #[test]
    fn test_partition_is_total_and_ordered() {
        let batch = batch_of(json!([
            {"job": "Engineer"},
            {"job": 5},
            {"title": "Engineer"},
            {"job": "Analyst"},
        ]));
        let report = partition(&batch, &jobs_schema());

        assert_eq!(report.accepted.len() + report.rejected.len(), batch.len());
        assert_eq!(report.accepted[0]["job"], "Engineer");
        assert_eq!(report.accepted[1]["job"], "Analyst");
        assert_eq!(report.rejected[0].index, 1);
        assert_eq!(report.rejected[1].index, 2);
    }

    #[test]
    fn test_reference_scenario() {
        // schema {job: string}, batch of one good row, one type mismatch,
        // one missing+extra key row
        let batch = batch_of(json!([
            {"job": "Engineer"},
            {"job": 5},
            {"title": "Engineer"},
        ]));
        let report = partition(&batch, &jobs_schema());

        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.rejected.len(), 2);

        let type_mismatch = &report.rejected[0];
        assert_eq!(type_mismatch.index, 1);
        assert_eq!(type_mismatch.reasons.len(), 1);
        assert!(type_mismatch.reasons[0].contains("'job'"));
        assert!(type_mismatch.reasons[0].contains("'int'"));
        assert!(type_mismatch.reasons[0].contains("'string'"));

        let wrong_keys = &report.rejected[1];
        assert_eq!(wrong_keys.index, 2);
        assert_eq!(wrong_keys.reasons.len(), 2);
        assert_eq!(wrong_keys.reasons[0], "missing keys: job");
        assert_eq!(wrong_keys.reasons[1], "unexpected keys: title");
    }

    #[test]
    fn test_missing_keys_sorted() {
        let batch = batch_of(json!([{"name": "Alice"}]));
        let report = partition(&batch, &hired_schema());

        assert_eq!(
            report.rejected[0].reasons[0],
            "missing keys: datetime, department_id, job_id"
        );
    }

    #[test]
    fn test_extra_keys_sorted() {
        let batch = batch_of(json!([{
            "name": "Alice",
            "datetime": "2021-07-27T16:02:08Z",
            "department_id": 1,
            "job_id": 2,
            "zeta": 1,
            "alpha": 1,
        }]));
        let report = partition(&batch, &hired_schema());

        assert_eq!(report.rejected[0].reasons, vec!["unexpected keys: alpha, zeta"]);
    }

    #[test]
    fn test_non_record_row() {
        let batch = batch_of(json!(["just a string"]));
        let report = partition(&batch, &jobs_schema());

        assert_eq!(report.rejected[0].reasons.len(), 1);
        assert!(report.rejected[0].reasons[0].contains("not a record"));
        assert!(report.rejected[0].reasons[0].contains("'string'"));
    }

    #[test]
    fn test_no_numeric_coercion() {
        let batch = batch_of(json!([{
            "name": "Alice",
            "datetime": "2021-07-27T16:02:08Z",
            "department_id": 1.5,
            "job_id": 2,
        }]));
        let report = partition(&batch, &hired_schema());

        assert_eq!(
            report.rejected[0].reasons,
            vec!["field 'department_id' has type 'float', expected 'int'"]
        );
    }

    #[test]
    fn test_datetime_check_independent_of_type_check() {
        // Wrong type: only the type reason, the format check is skipped
        let batch = batch_of(json!([{
            "name": "Alice",
            "datetime": 1627392128,
            "department_id": 1,
            "job_id": 2,
        }]));
        let report = partition(&batch, &hired_schema());
        assert_eq!(report.rejected[0].reasons.len(), 1);
        assert!(report.rejected[0].reasons[0].contains("expected 'string'"));

        // Right type, bad format: the format reason stands alone
        let batch = batch_of(json!([{
            "name": "Alice",
            "datetime": "2021-07-27",
            "department_id": 1,
            "job_id": 2,
        }]));
        let report = partition(&batch, &hired_schema());
        assert_eq!(
            report.rejected[0].reasons,
            vec!["field 'datetime' is not a valid ISO 8601 datetime"]
        );
    }

    #[test]
    fn test_every_rejection_has_a_reason() {
        let batch = batch_of(json!([
            42,
            null,
            {"job": true},
            {"job": "ok", "extra": 1},
        ]));
        let report = partition(&batch, &jobs_schema());

        assert_eq!(report.rejected.len(), 4);
        for rejected in &report.rejected {
            assert!(!rejected.reasons.is_empty());
        }
    }

    #[test]
    fn test_rejected_row_serialization() {
        let rejected = RejectedRow {
            index: 3,
            row: json!({"job": 5}),
            reasons: vec!["field 'job' has type 'int', expected 'string'".into()],
        };
        let line = serde_json::to_string(&rejected).unwrap();
        let parsed: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["index"], 3);
        assert_eq!(parsed["row_data"]["job"], 5);
        assert!(parsed["reason"].as_array().unwrap().len() == 1);
    }
}
