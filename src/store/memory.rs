//! In-memory store backend
//!
//! Test double and dev backend for the [`SqlConnector`] seam. Tables are
//! declared up front with a [`TableSpec`]; connections buffer their work and
//! apply it on commit, so rollback and transaction-isolation tests exercise
//! the same paths a real backend would.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::schema::TableSchema;

use super::bulk::InsertStatement;
use super::errors::{StoreError, StoreResult};
use super::value::{ScanRow, SqlValue};
use super::{SqlConnection, SqlConnector};

/// Declared shape of one in-memory table
#[derive(Debug, Clone)]
pub struct TableSpec {
    /// Table name
    pub name: String,
    /// Full column list, in order (including the identity column)
    pub columns: Vec<String>,
    /// Auto-assigned integer column, if any
    pub identity: Option<String>,
    /// Columns whose values must be unique across the table
    pub unique: Vec<String>,
    /// Columns that reject null values
    pub not_null: Vec<String>,
}

impl TableSpec {
    /// Build a spec from a table schema: the export columns, with the
    /// schema's identity column auto-assigned.
    pub fn from_schema(schema: &TableSchema) -> Self {
        Self {
            name: schema.name.clone(),
            columns: schema
                .export_fields
                .iter()
                .map(|f| f.name.clone())
                .collect(),
            identity: Some(schema.identity.clone()),
            unique: Vec::new(),
            not_null: Vec::new(),
        }
    }

    /// Add a unique constraint on a column
    pub fn with_unique(mut self, column: &str) -> Self {
        self.unique.push(column.to_string());
        self
    }

    /// Add a not-null constraint on a column
    pub fn with_not_null(mut self, column: &str) -> Self {
        self.not_null.push(column.to_string());
        self
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

#[derive(Debug)]
struct TableState {
    spec: TableSpec,
    rows: Vec<Vec<SqlValue>>,
    next_identity: i64,
}

#[derive(Debug, Default)]
struct StoreState {
    tables: HashMap<String, TableState>,
    failing_truncates: HashSet<String>,
}

/// Shared in-memory store.
///
/// Cloneable handle; every connection sees the same committed state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table. Re-declaring a name replaces the old table.
    pub fn create_table(&self, spec: TableSpec) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let name = spec.name.clone();
        state.tables.insert(
            name,
            TableState {
                spec,
                rows: Vec::new(),
                next_identity: 1,
            },
        );
    }

    /// Declare one table per registry schema
    pub fn provision(&self, registry: &crate::schema::SchemaRegistry) {
        for name in registry.table_names() {
            if let Ok(schema) = registry.resolve(name) {
                self.create_table(TableSpec::from_schema(&schema));
            }
        }
    }

    /// Insert a full-width committed row directly (test seeding).
    pub fn seed_row(&self, table: &str, row: Vec<SqlValue>) -> StoreResult<()> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let table_state = state
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        if row.len() != table_state.spec.columns.len() {
            return Err(StoreError::ColumnMismatch {
                table: table.to_string(),
                expected: table_state.spec.columns.len(),
                actual: row.len(),
            });
        }

        if let Some(identity) = table_state.spec.identity.clone() {
            if let Some(idx) = table_state.spec.column_index(&identity) {
                if let SqlValue::Int(id) = row[idx] {
                    table_state.next_identity = table_state.next_identity.max(id + 1);
                }
            }
        }

        table_state.rows.push(row);
        Ok(())
    }

    /// Committed rows of a table (test assertions)
    pub fn rows(&self, table: &str) -> StoreResult<Vec<Vec<SqlValue>>> {
        let state = self.state.lock().expect("store mutex poisoned");
        state
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
    }

    /// Make the next truncate of `table` fail (failure-path tests)
    pub fn fail_next_truncate(&self, table: &str) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.failing_truncates.insert(table.to_string());
    }
}

impl SqlConnector for InMemoryStore {
    fn connect(&self) -> StoreResult<Box<dyn SqlConnection>> {
        Ok(Box::new(InMemoryConnection {
            state: Arc::clone(&self.state),
            pending: Vec::new(),
        }))
    }
}

#[derive(Debug)]
enum PendingOp {
    Insert { table: String, row: Vec<SqlValue> },
    Truncate { table: String },
}

/// One buffered transactional session against the shared state
struct InMemoryConnection {
    state: Arc<Mutex<StoreState>>,
    pending: Vec<PendingOp>,
}

impl InMemoryConnection {
    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".into()))
    }

    /// Rows of `table` as this session sees them: committed state with the
    /// session's pending operations applied in order.
    fn visible_rows(state: &StoreState, pending: &[PendingOp], table: &str) -> Vec<Vec<SqlValue>> {
        let mut rows = state
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default();

        for op in pending {
            match op {
                PendingOp::Truncate { table: t } if t == table => rows.clear(),
                PendingOp::Insert { table: t, row } if t == table => rows.push(row.clone()),
                _ => {}
            }
        }

        rows
    }

    fn pending_insert_count(&self, table: &str) -> i64 {
        self.pending
            .iter()
            .filter(|op| matches!(op, PendingOp::Insert { table: t, .. } if t == table))
            .count() as i64
    }

    fn check_constraints(
        spec: &TableSpec,
        visible: &[Vec<SqlValue>],
        row: &[SqlValue],
    ) -> StoreResult<()> {
        for column in &spec.not_null {
            if let Some(idx) = spec.column_index(column) {
                if row[idx] == SqlValue::Null {
                    return Err(StoreError::ConstraintViolation {
                        table: spec.name.clone(),
                        column: column.clone(),
                        reason: "null value in not-null column".into(),
                    });
                }
            }
        }

        for column in &spec.unique {
            if let Some(idx) = spec.column_index(column) {
                if row[idx] == SqlValue::Null {
                    continue;
                }
                if visible.iter().any(|existing| existing[idx] == row[idx]) {
                    return Err(StoreError::ConstraintViolation {
                        table: spec.name.clone(),
                        column: column.clone(),
                        reason: format!("duplicate value ({:?})", row[idx]),
                    });
                }
            }
        }

        Ok(())
    }
}

impl SqlConnection for InMemoryConnection {
    fn execute_insert(
        &mut self,
        statement: &InsertStatement,
        rows: &[Vec<SqlValue>],
    ) -> StoreResult<()> {
        let mut staged: Vec<Vec<SqlValue>> = Vec::with_capacity(rows.len());
        {
            let state = self.lock()?;
            let table_state = state
                .tables
                .get(&statement.table)
                .ok_or_else(|| StoreError::UnknownTable(statement.table.clone()))?;
            let spec = &table_state.spec;

            let mut bound_indices = Vec::with_capacity(statement.columns.len());
            for column in &statement.columns {
                let idx = spec
                    .column_index(column)
                    .ok_or_else(|| StoreError::UnknownColumn {
                        table: statement.table.clone(),
                        column: column.clone(),
                    })?;
                bound_indices.push(idx);
            }

            let mut visible = Self::visible_rows(&state, &self.pending, &statement.table);
            let mut next_identity =
                table_state.next_identity + self.pending_insert_count(&statement.table);
            let identity_index = spec
                .identity
                .as_deref()
                .and_then(|column| spec.column_index(column));

            for row in rows {
                if row.len() != statement.columns.len() {
                    return Err(StoreError::ColumnMismatch {
                        table: statement.table.clone(),
                        expected: statement.columns.len(),
                        actual: row.len(),
                    });
                }

                let mut full = vec![SqlValue::Null; spec.columns.len()];
                for (value, &idx) in row.iter().zip(&bound_indices) {
                    full[idx] = value.clone();
                }
                if let Some(idx) = identity_index {
                    full[idx] = SqlValue::Int(next_identity);
                    next_identity += 1;
                }

                Self::check_constraints(spec, &visible, &full)?;
                visible.push(full.clone());
                staged.push(full);
            }
        }

        for row in staged {
            self.pending.push(PendingOp::Insert {
                table: statement.table.clone(),
                row,
            });
        }
        Ok(())
    }

    fn scan_table(&mut self, table: &str) -> StoreResult<Vec<ScanRow>> {
        let state = self.lock()?;
        let table_state = state
            .tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        let columns = table_state.spec.columns.clone();

        let rows = Self::visible_rows(&state, &self.pending, table);
        Ok(rows
            .into_iter()
            .map(|row| ScanRow::new(columns.iter().cloned().zip(row).collect()))
            .collect())
    }

    fn truncate_table(&mut self, table: &str) -> StoreResult<()> {
        let mut state = self.lock()?;
        if !state.tables.contains_key(table) {
            return Err(StoreError::UnknownTable(table.to_string()));
        }
        if state.failing_truncates.remove(table) {
            return Err(StoreError::Unavailable(format!(
                "truncate of '{}' refused by store",
                table
            )));
        }
        drop(state);

        self.pending.push(PendingOp::Truncate {
            table: table.to_string(),
        });
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        let ops: Vec<PendingOp> = self.pending.drain(..).collect();
        let mut state = self.lock()?;
        for op in ops {
            match op {
                PendingOp::Truncate { table } => {
                    if let Some(table_state) = state.tables.get_mut(&table) {
                        table_state.rows.clear();
                    }
                }
                PendingOp::Insert { table, row } => {
                    if let Some(table_state) = state.tables.get_mut(&table) {
                        if let Some(identity) = table_state.spec.identity.clone() {
                            if let Some(idx) = table_state.spec.column_index(&identity) {
                                if let SqlValue::Int(id) = row[idx] {
                                    table_state.next_identity =
                                        table_state.next_identity.max(id + 1);
                                }
                            }
                        }
                        table_state.rows.push(row);
                    }
                }
            }
        }
        Ok(())
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.pending.clear();
        Ok(())
    }
}
