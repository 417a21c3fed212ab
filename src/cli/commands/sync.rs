//! Snapshot export and import commands.
//!
//! Progress is drawn on stderr. With `--output` the export summary and digest
//! go to stdout; without it stdout carries the snapshot itself.

use crate::cli::commands::{open_storage, progress_printer};
use crate::config::{default_actor, resolve_chunk_size};
use crate::error::{Error, Result};
use crate::storage::events::EventType;
use crate::storage::SqliteStorage;
use crate::sync::{
    read_snapshot, snapshot_digest, write_snapshot, EntityKind, Exporter, Importer, Snapshot,
};
use crate::validate::find_similar_ids;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execute the export command.
///
/// # Errors
///
/// Returns `ProfileNotFound` (with suggestions when close matches exist), or
/// any storage, serialization or file error.
pub fn export(
    profile_id: &str,
    output: Option<&Path>,
    chunk_size: Option<usize>,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let chunk_size = resolve_chunk_size(chunk_size)?;
    let mut storage = open_storage(db_path)?;
    let actor = actor.map(ToString::to_string).unwrap_or_else(default_actor);

    require_profile(&storage, profile_id)?;

    let show_progress = !json && !quiet;
    let snapshot = Exporter::new(&storage)
        .with_chunk_size(chunk_size)
        .export(profile_id, progress_printer("Exporting", show_progress))?;

    let digest = snapshot_digest(&snapshot)?;
    storage.mutate("export_snapshot", &actor, |_, ctx| {
        ctx.record_comment("profile", profile_id, EventType::SnapshotExported, &digest);
        Ok(())
    })?;

    let Some(path) = output else {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        if show_progress {
            eprintln!("Digest: {digest}");
        }
        return Ok(());
    };

    write_snapshot(path, &snapshot)?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "profile": profile_id,
            "output": path.display().to_string(),
            "digest": digest,
            "counts": kind_counts(&snapshot),
            "total": snapshot.total_records(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Export complete for profile: {}", profile_id.cyan());
        println!();
        print_kind_counts(&snapshot);
        println!();
        println!("  Total: {} records", snapshot.total_records());
        println!("  Location: {}", path.display());
        println!("  Digest: {digest}");
    }

    Ok(())
}

/// Execute the import command.
///
/// # Errors
///
/// Returns `ImportConflict` when at least half of the records fail, a
/// `Sync` error when the file is missing or malformed, or a storage error.
pub fn import(
    file: &Path,
    chunk_size: Option<usize>,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let chunk_size = resolve_chunk_size(chunk_size)?;
    let snapshot = read_snapshot(file)?;
    let mut storage = open_storage(db_path)?;
    let actor = actor.map(ToString::to_string).unwrap_or_else(default_actor);

    let show_progress = !json && !quiet;
    let result = Importer::new(&mut storage, &actor)
        .with_chunk_size(chunk_size)
        .import(&snapshot, progress_printer("Importing", show_progress));

    let status = match result {
        Ok(status) => status,
        Err(Error::ImportConflict(descriptor)) => {
            if !json && !quiet {
                eprintln!("{}", "Import conflict".red().bold());
                for entry in &descriptor.conflicts {
                    eprintln!("  [{}] {}", entry.index, entry.message);
                }
            }
            return Err(Error::ImportConflict(descriptor));
        }
        Err(e) => return Err(e),
    };

    if json {
        let output = serde_json::json!({
            "success": true,
            "file": file.display().to_string(),
            "status": status,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Import complete from: {}", file.display());
        println!();
        println!("  Imported: {}", status.successful_records.to_string().green());
        if status.failed_records > 0 {
            println!("  Failed:   {}", status.failed_records.to_string().yellow());
        }
        println!("  Total:    {}", status.total_records);
        if !status.errors.is_empty() {
            println!();
            println!("{}", "Warnings".yellow().bold());
            for error in &status.errors {
                println!("  • {error}");
            }
        }
    }

    Ok(())
}

/// Fail with `ProfileNotFound`, suggesting near-miss ids when there are any.
fn require_profile(storage: &SqliteStorage, profile_id: &str) -> Result<()> {
    match storage.get_profile(profile_id) {
        Ok(_) => Ok(()),
        Err(Error::ProfileNotFound { id }) => {
            let all_ids = storage.get_all_profile_ids().unwrap_or_default();
            let similar = find_similar_ids(&id, &all_ids, 3);
            if similar.is_empty() {
                Err(Error::ProfileNotFound { id })
            } else {
                Err(Error::ProfileNotFoundSimilar { id, similar })
            }
        }
        Err(e) => Err(e),
    }
}

fn kind_counts(snapshot: &Snapshot) -> serde_json::Map<String, serde_json::Value> {
    EntityKind::ALL
        .iter()
        .map(|kind| {
            (
                kind.as_str().to_string(),
                serde_json::Value::from(snapshot.records(*kind).len()),
            )
        })
        .collect()
}

fn print_kind_counts(snapshot: &Snapshot) {
    for kind in EntityKind::ALL {
        let count = snapshot.records(kind).len();
        if count > 0 {
            println!("  {:<20} {count}", format!("{kind}:"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Profile, WorkoutLog};
    use tempfile::TempDir;

    fn seeded_db(temp_dir: &TempDir) -> (PathBuf, Profile) {
        let db = temp_dir.path().join("liftlog.db");
        let mut storage = SqliteStorage::open(&db).unwrap();
        let profile = Profile::new("Sam");
        storage.save(&profile, "test").unwrap();
        storage
            .save(&WorkoutLog::new(&profile.id, "Push day"), "test")
            .unwrap();
        (db, profile)
    }

    #[test]
    fn test_export_then_import_into_fresh_database() {
        let temp_dir = TempDir::new().unwrap();
        let (db, profile) = seeded_db(&temp_dir);
        let file = temp_dir.path().join("backup.json");

        export(&profile.id, Some(&file), Some(1), Some(&db), Some("test"), true, true).unwrap();
        assert!(file.exists());

        let fresh = temp_dir.path().join("fresh.db");
        drop(SqliteStorage::open(&fresh).unwrap());
        import(&file, None, Some(&fresh), Some("test"), true, true).unwrap();

        let storage = SqliteStorage::open(&fresh).unwrap();
        assert_eq!(storage.get_profile(&profile.id).unwrap().name, "Sam");
        assert_eq!(storage.count::<WorkoutLog>(Some(&profile.id)).unwrap(), 1);
    }

    #[test]
    fn test_export_records_digest_event() {
        let temp_dir = TempDir::new().unwrap();
        let (db, profile) = seeded_db(&temp_dir);
        let file = temp_dir.path().join("backup.json");

        export(&profile.id, Some(&file), None, Some(&db), Some("test"), true, true).unwrap();

        let storage = SqliteStorage::open(&db).unwrap();
        let events = crate::storage::events::get_events_by_type(
            storage.conn(),
            EventType::SnapshotExported,
            None,
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        let digest = snapshot_digest(&read_snapshot(&file).unwrap()).unwrap();
        assert_eq!(events[0].comment.as_deref(), Some(digest.as_str()));
    }

    #[test]
    fn test_export_unknown_profile_suggests_close_ids() {
        let temp_dir = TempDir::new().unwrap();
        let (db, profile) = seeded_db(&temp_dir);
        let mut typo = profile.id.clone();
        typo.pop();

        let err = export(&typo, None, None, Some(&db), Some("test"), true, true).unwrap_err();
        match err {
            Error::ProfileNotFoundSimilar { similar, .. } => assert_eq!(similar, vec![profile.id]),
            other => panic!("unexpected error: {other}"),
        }

        let err = export("nobody", None, None, Some(&db), Some("test"), true, true).unwrap_err();
        assert!(matches!(err, Error::ProfileNotFound { .. }));
    }

    #[test]
    fn test_import_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let (db, _) = seeded_db(&temp_dir);

        let err = import(
            &temp_dir.path().join("absent.json"),
            None,
            Some(&db),
            Some("test"),
            true,
            true,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 6);
    }
}
