//! CLI command implementations
//!
//! Commands load the JSON config, wire the service state, and delegate to
//! the core pipelines. The dev backend is the in-memory store and blob
//! store; a production database or object-store driver plugs in at the
//! `SqlConnector`/`BlobStore` seams without touching any command.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{self, ServiceOptions, ServiceState};
use crate::blob::InMemoryBlobStore;
use crate::schema::SchemaRegistry;
use crate::snapshot::ExportOutcome;
use crate::store::InMemoryStore;

use super::errors::{CliError, CliResult};

fn default_max_batch_rows() -> usize {
    1000
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./log")
}

fn default_port() -> u16 {
    8000
}

/// Service configuration, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Dataset name used in snapshot paths (required)
    pub dataset: String,

    /// Maximum rows per ingestion batch (optional, default 1000)
    #[serde(default = "default_max_batch_rows")]
    pub max_batch_rows: usize,

    /// Directory for rejection logs (optional, default ./log)
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// HTTP listen port (optional, default 8000)
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> CliResult<Config> {
        let contents = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| CliError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }

    fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            dataset: self.dataset.clone(),
            log_dir: self.log_dir.clone(),
            max_batch_rows: self.max_batch_rows,
        }
    }
}

fn build_state(config: &Config) -> Arc<ServiceState> {
    let registry = SchemaRegistry::builtin();
    let store = InMemoryStore::new();
    store.provision(&registry);

    Arc::new(ServiceState::new(
        registry,
        Arc::new(store),
        Arc::new(InMemoryBlobStore::new()),
        config.service_options(),
    ))
}

/// Start the HTTP service
pub fn serve(config_path: &Path, port_override: Option<u16>) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let port = port_override.unwrap_or(config.port);
    let state = build_state(&config);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::operation(format!("failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        api::serve(state, port)
            .await
            .map_err(|e| CliError::operation(format!("HTTP server failed: {}", e)))
    })
}

/// Export one table to a snapshot
pub fn export(config_path: &Path, table: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let state = build_state(&config);

    match state.exporter.export_table(table) {
        Ok(ExportOutcome::Written { path, rows, checksum }) => {
            println!("exported {} rows to {} (crc32 {:08x})", rows, path, checksum);
            Ok(())
        }
        Ok(ExportOutcome::NothingToExport) => {
            println!("table '{}' is empty, nothing to export", table);
            Ok(())
        }
        Err(e) => Err(CliError::operation(e.to_string())),
    }
}

/// Restore one table from a snapshot
pub fn restore(config_path: &Path, table: &str, snapshot_path: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let state = build_state(&config);

    match state.restorer.restore_table(table, snapshot_path) {
        Ok(report) => {
            println!(
                "restored {} of {} rows into '{}'",
                report.inserted,
                report.total(),
                table
            );
            for failure in &report.failures {
                println!("  row {} skipped: {}", failure.index, failure.reason);
            }
            Ok(())
        }
        Err(e) => Err(CliError::operation(e.to_string())),
    }
}
