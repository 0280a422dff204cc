//! Schema error types
//!
//! Error codes:
//! - ROWDOCK_TABLE_NOT_FOUND (REJECT)
//! - ROWDOCK_TABLE_ALREADY_REGISTERED (REJECT)

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Table identifier not present in the registry
    TableNotFound,
    /// Attempt to register a second schema under an existing name
    TableAlreadyRegistered,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::TableNotFound => "ROWDOCK_TABLE_NOT_FOUND",
            SchemaErrorCode::TableAlreadyRegistered => "ROWDOCK_TABLE_ALREADY_REGISTERED",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    table: String,
}

impl SchemaError {
    /// Create a table-not-found error
    pub fn table_not_found(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            code: SchemaErrorCode::TableNotFound,
            message: format!("Table '{}' is not registered", table),
            table,
        }
    }

    /// Create an already-registered error
    pub fn already_registered(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            code: SchemaErrorCode::TableAlreadyRegistered,
            message: format!("Table '{}' is already registered", table),
            table,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table name the error refers to
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
