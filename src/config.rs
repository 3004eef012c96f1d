//! End-of-run reporting settings from the environment or a TOML file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::{ProfileError, Result};

/// Environment variable naming the report path.
pub const ENV_OUTPUT: &str = "REGION_PROFILE_OUT";
/// Environment variable for the number of regions logged by `finish`.
pub const ENV_SUMMARY_TOP: &str = "REGION_PROFILE_TOP";

const DEFAULT_SUMMARY_TOP: usize = 10;

/// Where and how a host's end-of-run profile is reported.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// Report path; `None` means log only.
    pub output: Option<PathBuf>,
    /// How many of the most expensive regions `finish` logs.
    pub summary_top: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            output: None,
            summary_top: DEFAULT_SUMMARY_TOP,
        }
    }
}

impl ProfileConfig {
    /// Builds a config from `REGION_PROFILE_OUT` and `REGION_PROFILE_TOP`.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Overlays environment variables on top of `self`.
    pub fn with_env(mut self) -> Self {
        if let Some(path) = std::env::var_os(ENV_OUTPUT).filter(|v| !v.is_empty()) {
            self.output = Some(PathBuf::from(path));
        }
        if let Ok(raw) = std::env::var(ENV_SUMMARY_TOP) {
            match raw.trim().parse() {
                Ok(top) => self.summary_top = top,
                Err(_) => warn!(
                    var = ENV_SUMMARY_TOP,
                    value = %raw,
                    "ignoring unparsable profile summary size"
                ),
            }
        }
        self
    }

    /// Reads a TOML config file; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ProfileError::open(path, source)),
        };
        toml::from_str(&contents).map_err(|source| ProfileError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
