//! Table schemas and the schema registry
//!
//! A [`TableSchema`] is the declarative contract for one destination table:
//! field names and primitive types, optional per-field extra checks, the
//! fixed insert-column order, and the snapshot export shape. Schemas are
//! immutable once registered.
//!
//! The [`SchemaRegistry`] maps table identifiers to schemas. Adding a table
//! means adding one registry entry, never editing conditional logic in a
//! caller.

mod errors;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use registry::SchemaRegistry;
pub use types::{ExportField, ExportKind, FieldCheck, FieldDef, FieldType, TableSchema};
