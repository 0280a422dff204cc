//! Rejection diagnostics sink
//!
//! One append-only log per (table, run): `{log_dir}/{table}/rejected_{run_id}.log`,
//! one JSON object per rejected row. The sink is a plain owned value
//! constructed inside the ingestion call and passed down; there is no
//! shared global handler state, so concurrent ingestions for the same table
//! cannot race on initialization.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::validate::RejectedRow;

/// Append-only rejection log for one (table, run) pair
#[derive(Debug)]
pub struct RejectionLog {
    path: PathBuf,
    file: File,
}

impl RejectionLog {
    /// Create the sink for a run, creating the per-table directory if
    /// needed.
    pub fn create(log_dir: &Path, table: &str, run_id: Uuid) -> io::Result<Self> {
        let dir = log_dir.join(table);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("rejected_{}.log", run_id.simple()));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self { path, file })
    }

    /// Append one rejected row as a single JSON line
    pub fn record(&mut self, rejected: &RejectedRow) -> io::Result<()> {
        let line = serde_json::to_string(rejected)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
