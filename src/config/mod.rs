//! Configuration management.
//!
//! This module resolves the database path, the actor recorded on audit
//! events, and pipeline tuning such as the chunk size.
//!
//! # Layout
//!
//! Liftlog keeps one global database:
//! - **Database**: `~/.liftlog/data/liftlog.db`
//! - **Test database**: `~/.liftlog/test/liftlog.db`, selected by `LIFTLOG_TEST_DB=1`
//!
//! Snapshot files live wherever the user points `export --output` at.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sync::DEFAULT_CHUNK_SIZE;

/// Get the global Liftlog directory location (`~/.liftlog/`).
#[must_use]
pub fn global_liftlog_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".liftlog"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `LIFTLOG_TEST_DB=1` (or any non-empty value
/// other than `0` / `false`).
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("LIFTLOG_TEST_DB")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test database path.
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_liftlog_dir().map(|dir| dir.join("test").join("liftlog.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. `explicit_path` (the `--db` flag, or `LIFTLOG_DB` through clap)
/// 2. `LIFTLOG_TEST_DB` → isolated test database
/// 3. Global location: `~/.liftlog/data/liftlog.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    global_liftlog_dir().map(|dir| dir.join("data").join("liftlog.db"))
}

/// Get the default actor name.
///
/// Priority:
/// 1. `LIFTLOG_ACTOR` environment variable
/// 2. System username
/// 3. "unknown"
#[must_use]
pub fn default_actor() -> String {
    if let Ok(actor) = std::env::var("LIFTLOG_ACTOR") {
        if !actor.is_empty() {
            return actor;
        }
    }

    if let Ok(user) = std::env::var("USER") {
        if !user.is_empty() {
            return user;
        }
    }

    "unknown".to_string()
}

/// Resolve the export/import chunk size.
///
/// An explicit `--chunk-size` wins over `LIFTLOG_CHUNK_SIZE`; with neither
/// set the default of 100 applies.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when the value is zero or not a number.
pub fn resolve_chunk_size(explicit: Option<usize>) -> Result<usize> {
    if let Some(size) = explicit {
        return check_chunk_size(size);
    }

    match std::env::var("LIFTLOG_CHUNK_SIZE") {
        Ok(raw) if !raw.trim().is_empty() => parse_chunk_size(&raw),
        _ => Ok(DEFAULT_CHUNK_SIZE),
    }
}

/// Parse a chunk size from text.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for non-numeric or zero input.
pub fn parse_chunk_size(raw: &str) -> Result<usize> {
    let size = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::InvalidArgument(format!("Invalid chunk size: {raw}")))?;
    check_chunk_size(size)
}

fn check_chunk_size(size: usize) -> Result<usize> {
    if size == 0 {
        return Err(Error::InvalidArgument(
            "Invalid chunk size: must be greater than zero".to_string(),
        ));
    }
    Ok(size)
}
