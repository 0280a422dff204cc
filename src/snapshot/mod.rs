//! Table export to columnar snapshots
//!
//! A snapshot is one self-describing Parquet object holding the full
//! contents of a table under its registered export schema, written to
//! object storage at `{dataset}/{table}/{table}_{run_id}.parquet`. The run
//! id is a UUID, so rapid repeated exports of the same table can never
//! collide on a name.
//!
//! An empty table short-circuits: no bytes are built, nothing is uploaded,
//! and the caller receives an explicit [`ExportOutcome::NothingToExport`].

mod errors;
mod record;
mod writer;

pub use errors::{SnapshotError, SnapshotResult};
pub use record::flatten_row;
pub use writer::{ExportOutcome, SnapshotWriter};
