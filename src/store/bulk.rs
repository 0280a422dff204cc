//! Transactional bulk writer
//!
//! One call inserts an entire accepted set as one atomic unit of work:
//! a single parameterized statement, all rows batched, all-or-nothing.
//! Any store-level failure rolls back every row of the call.

use serde_json::{Map, Value};

use crate::schema::TableSchema;

use super::errors::{StoreError, StoreResult};
use super::value::SqlValue;
use super::SqlConnection;

/// A parameterized insert statement.
///
/// Carries both the SQL text (positional `?` placeholders, insert columns
/// verbatim in schema order) and the structured table/column form, so a
/// backend may bind whichever it prefers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub sql: String,
}

impl InsertStatement {
    /// Build the statement for a table and column list
    pub fn new(table: &str, columns: &[String]) -> Self {
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );
        Self {
            table: table.to_string(),
            columns: columns.to_vec(),
            sql,
        }
    }

    /// Build the insert statement for a schema's fixed insert-column order
    pub fn for_schema(schema: &TableSchema) -> Self {
        Self::new(&schema.name, &schema.insert_columns)
    }
}

/// Insert accepted rows as one atomic unit of work.
///
/// Zero accepted rows still issues a commit so no implicit transaction is
/// left open. On any failure the whole accepted set is rolled back and the
/// error propagates; there is no partial commit within one call.
///
/// Returns the number of rows inserted.
pub fn insert_batch(
    conn: &mut dyn SqlConnection,
    schema: &TableSchema,
    rows: &[Map<String, Value>],
) -> StoreResult<usize> {
    if rows.is_empty() {
        conn.commit()?;
        return Ok(0);
    }

    let statement = InsertStatement::for_schema(schema);

    let mut bound: Vec<Vec<SqlValue>> = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(statement.columns.len());
        for column in &statement.columns {
            let value = row.get(column).unwrap_or(&Value::Null);
            let value = SqlValue::from_json(value).ok_or_else(|| StoreError::UnsupportedValue {
                column: column.clone(),
                detail: "nested values cannot be bound".into(),
            })?;
            values.push(value);
        }
        bound.push(values);
    }

    if let Err(err) = conn.execute_insert(&statement, &bound) {
        let _ = conn.rollback();
        return Err(err);
    }

    conn.commit()?;
    Ok(bound.len())
}
