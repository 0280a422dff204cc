//! Schema registry
//!
//! Fixed, explicit mapping from table identifier to [`TableSchema`].
//! Resolution happens once per operation; callers never branch on table
//! names themselves.

use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{SchemaError, SchemaResult};
use super::types::{ExportField, ExportKind, FieldDef, TableSchema};

/// Registry of table schemas.
///
/// [`SchemaRegistry::builtin`] holds the production tables. Tests may
/// [`SchemaRegistry::register`] additional tables.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: HashMap<String, Arc<TableSchema>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Registry pre-populated with the production tables:
    /// `jobs`, `departments`, and `hired_employees`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry
            .register(TableSchema {
                name: "jobs".into(),
                fields: vec![("job".into(), FieldDef::string())],
                insert_columns: vec!["job".into()],
                export_fields: vec![
                    ExportField::new("id", ExportKind::Long, false),
                    ExportField::new("job", ExportKind::Str, true),
                ],
                identity: "id".into(),
            })
            .expect("builtin registry is collision-free");

        registry
            .register(TableSchema {
                name: "departments".into(),
                fields: vec![("department".into(), FieldDef::string())],
                insert_columns: vec!["department".into()],
                export_fields: vec![
                    ExportField::new("id", ExportKind::Long, false),
                    ExportField::new("department", ExportKind::Str, true),
                ],
                identity: "id".into(),
            })
            .expect("builtin registry is collision-free");

        registry
            .register(TableSchema {
                name: "hired_employees".into(),
                fields: vec![
                    ("name".into(), FieldDef::string()),
                    ("datetime".into(), FieldDef::iso_datetime()),
                    ("department_id".into(), FieldDef::int()),
                    ("job_id".into(), FieldDef::int()),
                ],
                insert_columns: vec![
                    "name".into(),
                    "datetime".into(),
                    "department_id".into(),
                    "job_id".into(),
                ],
                export_fields: vec![
                    ExportField::new("id", ExportKind::Long, false),
                    ExportField::new("name", ExportKind::Str, true),
                    ExportField::new("datetime", ExportKind::Str, true),
                    ExportField::new("department_id", ExportKind::Long, true),
                    ExportField::new("job_id", ExportKind::Long, true),
                ],
                identity: "id".into(),
            })
            .expect("builtin registry is collision-free");

        registry
    }

    /// Register a schema under its table name.
    ///
    /// # Errors
    ///
    /// Returns `ROWDOCK_TABLE_ALREADY_REGISTERED` if the name is taken.
    pub fn register(&mut self, schema: TableSchema) -> SchemaResult<()> {
        if self.tables.contains_key(&schema.name) {
            return Err(SchemaError::already_registered(&schema.name));
        }
        self.tables
            .insert(schema.name.clone(), Arc::new(schema));
        Ok(())
    }

    /// Resolve a table name to its schema.
    ///
    /// # Errors
    ///
    /// Returns `ROWDOCK_TABLE_NOT_FOUND` for unknown identifiers.
    pub fn resolve(&self, table: &str) -> SchemaResult<Arc<TableSchema>> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| SchemaError::table_not_found(table))
    }

    /// Names of all registered tables, unordered
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|name| name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::FieldType;
    use super::*;

    #[test]
    fn test_builtin_tables_resolve() {
        let registry = SchemaRegistry::builtin();
        for table in ["jobs", "departments", "hired_employees"] {
            let schema = registry.resolve(table).unwrap();
            assert_eq!(schema.name, table);
            assert_eq!(schema.identity, "id");
        }
    }

    #[test]
    fn test_unknown_table_rejected() {
        let registry = SchemaRegistry::builtin();
        let err = registry.resolve("invoices").unwrap_err();
        assert_eq!(err.code().code(), "ROWDOCK_TABLE_NOT_FOUND");
    }

    #[test]
    fn test_hired_employees_shape() {
        let registry = SchemaRegistry::builtin();
        let schema = registry.resolve("hired_employees").unwrap();

        assert_eq!(
            schema.insert_columns,
            vec!["name", "datetime", "department_id", "job_id"]
        );
        assert_eq!(schema.field("job_id").unwrap().field_type, FieldType::Int);
        assert!(schema.field("datetime").unwrap().check.is_some());

        // Identity column is the only non-nullable export field
        for field in &schema.export_fields {
            assert_eq!(field.nullable, field.name != "id");
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = SchemaRegistry::builtin();
        let schema = (*registry.resolve("jobs").unwrap()).clone();
        let err = registry.register(schema).unwrap_err();
        assert_eq!(err.code().code(), "ROWDOCK_TABLE_ALREADY_REGISTERED");
    }

    #[test]
    fn test_register_new_table() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(TableSchema {
                name: "metrics".into(),
                fields: vec![
                    ("metric".into(), FieldDef::string()),
                    ("value".into(), FieldDef::float()),
                ],
                insert_columns: vec!["metric".into(), "value".into()],
                export_fields: vec![
                    ExportField::new("id", ExportKind::Long, false),
                    ExportField::new("metric", ExportKind::Str, true),
                    ExportField::new("value", ExportKind::Double, true),
                ],
                identity: "id".into(),
            })
            .unwrap();

        assert!(registry.resolve("metrics").is_ok());
    }
}
