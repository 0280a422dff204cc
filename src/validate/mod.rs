//! Batch validation and partitioning
//!
//! Validation semantics:
//! - The batch itself must be a non-empty array within the configured size
//!   bound; violations are fatal ([`BatchError`]) and checked before any row
//!   is inspected.
//! - Row-level findings never abort the batch: every row lands in exactly
//!   one of the accepted or rejected outputs, in original order, and each
//!   rejected row carries at least one human-readable reason.
//!
//! Forbidden behaviors:
//! - Implicit type coercion (an int is never accepted for a float field)
//! - Partial validation (every check that applies to a row is run)
//! - Mutation of accepted rows

mod datetime;
mod errors;
mod partition;

pub use datetime::{is_iso_datetime, parse_iso_datetime};
pub use errors::BatchError;
pub use partition::{partition, Batch, RejectedRow, ValidationReport};
