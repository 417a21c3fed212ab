//! Content hashing for snapshots.
//!
//! A SHA-256 digest of the serialized snapshot identifies an export in CLI
//! output and in the audit trail, so two exports of unchanged data can be
//! told apart from a real change at a glance.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::sync::types::Snapshot;

/// Compute a SHA-256 hex digest of a serializable value.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized to JSON.
pub fn content_hash<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest of a snapshot's records, ignoring when it was taken.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be serialized.
pub fn snapshot_digest(snapshot: &Snapshot) -> Result<String> {
    let mut stamped = snapshot.clone();
    stamped.exported_at = String::new();
    content_hash(&stamped)
}
