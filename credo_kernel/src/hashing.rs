/// StudentCredo — Hashing
///
/// Two unrelated fingerprints live here:
///
///   - `generate_block_hash`: the display hash of a simulated ledger
///     entry. A 32-bit rolling hash over id/title/category/time plus a
///     hex time suffix. It is NOT a security boundary and makes no
///     collision-resistance claim.
///   - `canonical_hash`: SHA-256 over canonical JSON, used to check
///     snapshot integrity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::Achievement;

/// Fingerprint for a credential minted at `now`.
///
/// Format: 16 lowercase hex digits of |h| followed by the Unix time in
/// milliseconds in hex, where h is the Java-style `h*31 + c` rolling
/// hash (wrapping i32) over the UTF-16 units of
/// `{"id":..,"title":..,"category":..,"timestamp":<ms>}`.
pub fn generate_block_hash(achievement: &Achievement, now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis();
    let data = serde_json::json!({
        "id": achievement.id,
        "title": achievement.title,
        "category": achievement.category,
        "timestamp": millis,
    })
    .to_string();

    let hash = rolling_hash(&data);
    format!("{:016x}{:x}", (hash as i64).abs(), millis.max(0))
}

fn rolling_hash(data: &str) -> i32 {
    data.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32)
    })
}

/// Canonical serialization: compact UTF-8 JSON, declaration field order.
pub fn canonical_serialize<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(value)
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let bytes = canonical_serialize(value)?;
    Ok(sha256_hex(&bytes))
}

/// Lowercase hex SHA-256 of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
