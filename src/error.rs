//! Errors from the fallible export, import and config helpers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for the fallible report and config helpers.
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Errors surfaced by report export, report parsing and config loading.
///
/// None of the profiling operations themselves (`start`, `stop`, `add_bytes`,
/// `entries`, `clear`) can fail; these only come out of the `try_*`/`load`
/// helpers.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// There was nothing to export.
    #[error("no profiling data collected")]
    Empty,
    /// Report or config file could not be opened or created.
    #[error("could not open {path}: {source}")]
    Open {
        /// File the operation targeted.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Write or read failure after the file was opened.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// CSV encode/decode failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// JSON encode/decode failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// A report row could not be interpreted.
    #[error("malformed report {path} (record {line}): {message}")]
    Parse {
        /// Report being read.
        path: PathBuf,
        /// 1-based record number.
        line: u64,
        /// What was wrong with it.
        message: String,
    },
    /// Config file was not valid TOML for [`crate::ProfileConfig`].
    #[error("failed to parse profiler config {path}: {source}")]
    Config {
        /// Config file path.
        path: PathBuf,
        /// Parser error.
        source: toml::de::Error,
    },
}

impl ProfileError {
    pub(crate) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProfileError::Open {
            path: path.into(),
            source,
        }
    }
}
