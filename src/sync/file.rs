//! Atomic snapshot file operations.
//!
//! Snapshots are written to a temporary sibling file, synced to disk and
//! renamed over the target, so a crash never leaves a half-written export.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::sync::types::Snapshot;

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file (same path with `.tmp` appended)
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let file = File::create(temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        // Sync to disk before rename
        writer.get_ref().sync_all()?;
    }

    fs::rename(temp_path, path)?;

    Ok(())
}

/// Write a snapshot as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(snapshot)?;
    json.push(b'\n');
    atomic_write(path, &json)
}

/// Read a snapshot file.
///
/// Individual records are not validated here; only the top-level shape.
///
/// # Errors
///
/// Returns a `Sync` error if the file is missing or is not a snapshot.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Err(Error::Sync(format!(
            "Snapshot file not found: {}",
            path.display()
        )));
    }

    let content = fs::read(path)?;
    serde_json::from_slice(&content).map_err(|e| {
        Error::Sync(format!("Invalid snapshot file {}: {e}", path.display()))
    })
}
