//! Runtime configuration (`credo.toml`).
//!
//! Every field is optional:
//!
//! ```toml
//! store_dir = ".credo/store"
//! snapshot_dir = ".credo/snapshots"
//! seed_sample_data = false
//! log_filter = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "credo.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub store_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    pub seed_sample_data: bool,
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".credo/store"),
            snapshot_dir: PathBuf::from(".credo/snapshots"),
            seed_sample_data: false,
            log_filter: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read an explicit config file. A missing file is an error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// `path` when given, else `credo.toml` in the working directory if
    /// present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
