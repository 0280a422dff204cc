//! CLI error types

use thiserror::Error;

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

/// CLI failures, printed to stderr by main
#[derive(Debug, Error)]
pub enum CliError {
    /// Config file could not be read
    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("invalid config '{path}': {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A command-level operation failed
    #[error("{0}")]
    Operation(String),
}

impl CliError {
    /// Wrap an operation failure
    pub fn operation(message: impl Into<String>) -> Self {
        CliError::Operation(message.into())
    }
}
