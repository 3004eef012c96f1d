//! Low-overhead wall-clock and byte-throughput profiling of named code regions.
//!
//! Threads time regions independently; completed intervals are folded into a
//! shared registry under one short-lived lock and exported as a CSV or JSON
//! report sorted by total time. Building without the default `profile`
//! feature replaces everything with zero-sized no-ops.

#![warn(missing_docs)]

pub mod config;
pub mod entry;
pub mod error;
pub mod profiler;
pub mod report;

pub use config::ProfileConfig;
pub use entry::ProfileEntry;
pub use error::{ProfileError, Result};
pub use profiler::{add_bytes, clear, entries, scope, start, stop, Profiler, ScopedTimer};
pub use report::{dump, read_report, try_dump, ReportFormat};
