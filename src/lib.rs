//! rowdock - A strict, schema-validating batch ingestion and table snapshot service
//!
//! Untrusted batches of tabular records are validated against per-table
//! schemas, partitioned into accepted and rejected sets, and bulk-inserted
//! into a relational store as one transaction. Full tables can be exported
//! to Parquet snapshots in object storage and rebuilt from them.

pub mod api;
pub mod blob;
pub mod cli;
pub mod ingest;
pub mod observability;
pub mod reports;
pub mod restore;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod validate;
