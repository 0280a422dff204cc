//! Schema type definitions
//!
//! Supported field types:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - float: 64-bit floating point
//! - bool: Boolean
//!
//! A field may carry an extra check beyond its type (currently ISO-8601
//! datetime format on string fields).

use serde::{Deserialize, Serialize};

/// Supported primitive field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
        }
    }
}

/// Extra per-field validation beyond the primitive type check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCheck {
    /// Value must parse as an ISO-8601 datetime
    IsoDatetime,
}

/// Field definition: primitive type plus optional extra check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    pub field_type: FieldType,
    /// Extra check, run only after the type check passes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<FieldCheck>,
}

impl FieldDef {
    /// Create a string field
    pub fn string() -> Self {
        Self {
            field_type: FieldType::String,
            check: None,
        }
    }

    /// Create a string field validated as ISO-8601 datetime
    pub fn iso_datetime() -> Self {
        Self {
            field_type: FieldType::String,
            check: Some(FieldCheck::IsoDatetime),
        }
    }

    /// Create an int field
    pub fn int() -> Self {
        Self {
            field_type: FieldType::Int,
            check: None,
        }
    }

    /// Create a float field
    pub fn float() -> Self {
        Self {
            field_type: FieldType::Float,
            check: None,
        }
    }

    /// Create a bool field
    pub fn bool() -> Self {
        Self {
            field_type: FieldType::Bool,
            check: None,
        }
    }
}

/// Physical type of a snapshot export column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// 64-bit signed integer (also holds epoch-millisecond timestamps)
    Long,
    /// UTF-8 string
    Str,
    /// 64-bit floating point
    Double,
    /// Boolean
    Boolean,
}

/// One column of a table's snapshot export schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportField {
    /// Column name (snapshot records use lower-cased names)
    pub name: String,
    /// Physical type
    pub kind: ExportKind,
    /// Whether the column admits nulls; only the identity field does not
    pub nullable: bool,
}

impl ExportField {
    pub fn new(name: impl Into<String>, kind: ExportKind, nullable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable,
        }
    }
}

/// Complete schema for one destination table.
///
/// Immutable once registered. `fields` drives batch validation,
/// `insert_columns` is used verbatim for every write statement, and
/// `export_fields`/`identity` describe the snapshot shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Destination table name
    pub name: String,
    /// Ordered field definitions expected of every inbound row
    pub fields: Vec<(String, FieldDef)>,
    /// Column order for the parameterized insert statement
    pub insert_columns: Vec<String>,
    /// Ordered snapshot export columns
    pub export_fields: Vec<ExportField>,
    /// Name of the identity field, excluded from restore inserts
    pub identity: String,
}

impl TableSchema {
    /// Look up a field definition by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, def)| def)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Export fields excluding the identity column, in declared order.
    ///
    /// This is the insertable field list used when reloading a table from a
    /// snapshot.
    pub fn restorable_fields(&self) -> Vec<&ExportField> {
        self.export_fields
            .iter()
            .filter(|f| f.name != self.identity)
            .collect()
    }
}
