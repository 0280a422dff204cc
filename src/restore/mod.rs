//! Table restore from columnar snapshots
//!
//! Truncate-then-reload: the destination table is destructively truncated,
//! then every snapshot record is reinserted one at a time, each insert
//! individually committed or rolled back. One malformed record never aborts
//! the remaining rows; the report says exactly which rows failed and why.
//!
//! Contrast with the ingestion path's bulk writer, which is all-or-nothing
//! for a whole batch.

mod errors;
mod reader;
mod restorer;

pub use errors::{RestoreError, RestorePhase, RestoreResult};
pub use reader::decode_records;
pub use restorer::{RestoreReport, Restorer, RowFailure};
