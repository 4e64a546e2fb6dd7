//! Runtime error types.
//!
//! The data manager itself is total; these errors stay inside the
//! storage, configuration and snapshot layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("snapshot hash mismatch: recorded {recorded}, computed {computed}")]
    HashMismatch { recorded: String, computed: String },
    #[error("snapshot was taken with kernel v{found}, this build runs v{expected}")]
    KernelVersion { found: u32, expected: u32 },
    #[error("snapshot violates invariants: {0}")]
    Invariant(String),
}
