//! Snapshot layer — point-in-time backups of every persisted record.
//!
//! Snapshots contain canonical JSON + SHA-256 for verification.
//! Restore refuses anything that does not hash-check or that violates
//! the kernel invariants, so a bad backup never reaches the store.
//!
//! File naming: `snapshot_<YYYYMMDDTHHMMSSmmmZ>.json`, which sorts in
//! time order.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use credo_kernel::hashing::{canonical_hash, canonical_serialize, sha256_hex};
use credo_kernel::invariants::try_validate_invariants;
use credo_kernel::state::CredoState;
use credo_kernel::KERNEL_VERSION;

use crate::data_manager::DataManager;
use crate::error::SnapshotError;

const PREFIX: &str = "snapshot_";
const SUFFIX: &str = ".json";
const STAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

/// Snapshot on-disk format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    /// Canonical JSON of the full state (UTF-8).
    pub canonical_json: String,
    /// SHA-256 of the canonical JSON.
    pub hash: String,
    /// Kernel version at snapshot time.
    pub kernel_version: u32,
}

impl Snapshot {
    pub fn capture(state: &CredoState, taken_at: DateTime<Utc>) -> Result<Self, SnapshotError> {
        let bytes = canonical_serialize(state)?;
        Ok(Self {
            taken_at,
            hash: canonical_hash(state)?,
            canonical_json: String::from_utf8_lossy(&bytes).into_owned(),
            kernel_version: KERNEL_VERSION,
        })
    }

    pub fn state(&self) -> Result<CredoState, SnapshotError> {
        Ok(serde_json::from_str(&self.canonical_json)?)
    }
}

/// Write a snapshot of everything `manager` has stored.
pub fn save_snapshot(dir: &Path, manager: &DataManager) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;

    let mut taken_at = manager.now();
    let mut path = dir.join(file_name(taken_at));
    while path.exists() {
        taken_at += Duration::milliseconds(1);
        path = dir.join(file_name(taken_at));
    }

    let snap = Snapshot::capture(&manager.state(), taken_at)?;
    let content = serde_json::to_string(&snap)?;

    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    info!(path = %path.display(), hash = %snap.hash, "snapshot saved");
    Ok(path)
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load the most recent snapshot in `dir`, if any.
pub fn load_latest_snapshot(dir: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut latest: Option<String> = None;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        let is_snapshot = name
            .strip_prefix(PREFIX)
            .and_then(|s| s.strip_suffix(SUFFIX))
            .map_or(false, is_stamp);
        if is_snapshot && latest.as_ref().map_or(true, |best| name > *best) {
            latest = Some(name);
        }
    }

    match latest {
        Some(name) => load_snapshot(&dir.join(name)).map(Some),
        None => Ok(None),
    }
}

/// True if the recorded hash matches the canonical JSON content.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    sha256_hex(snap.canonical_json.as_bytes()) == snap.hash
}

/// Validate `snap` and write its records through `manager`, publishing
/// the usual change events. Nothing is written on error.
pub fn restore_snapshot(manager: &DataManager, snap: &Snapshot) -> Result<CredoState, SnapshotError> {
    if !verify_snapshot_hash(snap) {
        let computed = sha256_hex(snap.canonical_json.as_bytes());
        warn!(recorded = %snap.hash, %computed, "snapshot hash mismatch");
        return Err(SnapshotError::HashMismatch {
            recorded: snap.hash.clone(),
            computed,
        });
    }
    if snap.kernel_version != KERNEL_VERSION {
        return Err(SnapshotError::KernelVersion {
            found: snap.kernel_version,
            expected: KERNEL_VERSION,
        });
    }

    let state = snap.state()?;
    try_validate_invariants(&state).map_err(SnapshotError::Invariant)?;

    manager.replace_state(&state);
    info!(taken_at = %snap.taken_at, "snapshot restored");
    Ok(state)
}

fn is_stamp(stamp: &str) -> bool {
    stamp.is_ascii()
        && stamp.len() == 19
        && stamp.ends_with('Z')
        && stamp.chars().nth(8) == Some('T')
        && stamp[..8].chars().chain(stamp[9..18].chars()).all(|c| c.is_ascii_digit())
}

fn file_name(taken_at: DateTime<Utc>) -> String {
    format!("{}{}{}", PREFIX, taken_at.format(STAMP_FORMAT), SUFFIX)
}
