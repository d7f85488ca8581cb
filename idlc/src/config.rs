//! Compiler configuration.
//!
//! Loaded from an `idlc.toml` file; command-line flags override it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration for a compiler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dependency scan output (interface name to dependency files).
    pub interfaces_info: Option<PathBuf>,

    /// Where merged, overload-planned bundles are written.
    pub output_dir: PathBuf,

    /// Pretty-print the JSON output.
    pub pretty: bool,

    /// Stop at the first unit that fails instead of compiling the rest.
    pub fail_fast: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interfaces_info: None,
            output_dir: PathBuf::from("gen"),
            pretty: true,
            fail_fast: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}
