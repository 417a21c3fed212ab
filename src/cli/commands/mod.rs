//! Command implementations.

pub mod completions;
pub mod init;
pub mod maintenance;
pub mod profile;
pub mod status;
pub mod sync;
pub mod version;

use std::io::Write;
use std::path::PathBuf;

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use crate::sync::ProgressStatus;

/// Open the configured database, which must already exist.
pub(crate) fn open_storage(db_path: Option<&PathBuf>) -> Result<SqliteStorage> {
    let db_path = resolve_db_path(db_path.map(|p| p.as_path())).ok_or(Error::NotInitialized)?;

    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }

    SqliteStorage::open(&db_path)
}

/// Progress callback that redraws one stderr line per update.
///
/// Silent when `enabled` is false, so JSON and quiet runs keep stderr clean.
pub(crate) fn progress_printer(label: &str, enabled: bool) -> impl FnMut(&ProgressStatus) + '_ {
    move |status: &ProgressStatus| {
        if !enabled {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "\r{label}: {}/{} ({} failed)",
            status.processed_records, status.total_records, status.failed_records
        );
        if status.is_complete {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}
