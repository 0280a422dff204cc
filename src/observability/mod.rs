//! Observability for rowdock
//!
//! Structured JSON logging with deterministic key ordering. One log line is
//! one event; output is synchronous and unbuffered so diagnostic evidence
//! survives a crash mid-operation.
//!
//! # Usage
//!
//! ```ignore
//! use rowdock::observability::Logger;
//!
//! Logger::info("INGEST_COMPLETE", &[("table", "jobs"), ("inserted", "42")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
