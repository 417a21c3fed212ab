//! Data integrity audit.
//!
//! Checks every profile against its schema rules, and every workout log and
//! max log for a `profile_id` that no longer resolves.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::Result;
use crate::maintenance::types::IntegrityReport;
use crate::model::{MaxLog, Profile, WorkoutLog};
use crate::storage::entity::list_in;
use crate::storage::sqlite::SqliteStorage;

/// Audit the store and report every issue found.
///
/// # Errors
///
/// Returns an error if any collection cannot be read.
pub fn validate_data_integrity(storage: &SqliteStorage) -> Result<IntegrityReport> {
    let (profiles, logs, maxes) = storage.read(|conn| {
        Ok((
            list_in::<Profile>(conn, None)?,
            list_in::<WorkoutLog>(conn, None)?,
            list_in::<MaxLog>(conn, None)?,
        ))
    })?;

    let mut issues = Vec::new();

    for profile in &profiles {
        let validation = profile.validate();
        if !validation.is_valid() {
            issues.push(format!(
                "Profile {} failed validation: {}",
                profile.id,
                validation.message()
            ));
        }
    }

    let known: HashSet<&str> = profiles.iter().map(|p| p.id.as_str()).collect();

    for log in &logs {
        if !known.contains(log.profile_id.as_str()) {
            issues.push(format!(
                "Workout log {} references missing profile {}",
                log.id, log.profile_id
            ));
        }
    }

    for max in &maxes {
        if !known.contains(max.profile_id.as_str()) {
            issues.push(format!(
                "Max log {} references missing profile {}",
                max.id, max.profile_id
            ));
        }
    }

    let total_records_checked = profiles.len() + logs.len() + maxes.len();
    if issues.is_empty() {
        info!(total_records_checked, "Integrity check passed");
    } else {
        warn!(total_records_checked, issues = issues.len(), "Integrity issues found");
    }

    Ok(IntegrityReport {
        is_valid: issues.is_empty(),
        issues,
        total_records_checked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_store_is_valid() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let profile = Profile::new("Clean");
        storage.save(&profile, "test").unwrap();
        storage
            .save(&WorkoutLog::new(&profile.id, "Legs"), "test")
            .unwrap();

        let report = validate_data_integrity(&storage).unwrap();
        assert!(report.is_valid);
        assert!(report.issues.is_empty());
        assert_eq!(report.total_records_checked, 2);
    }

    #[test]
    fn test_orphaned_workout_log_is_one_issue() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.save(&Profile::new("Present"), "test").unwrap();
        let orphan = WorkoutLog::new("prof_vanished", "Ghost session");
        storage.save(&orphan, "test").unwrap();

        let report = validate_data_integrity(&storage).unwrap();

        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].contains(&orphan.id));
        assert!(report.issues[0].contains("prof_vanished"));
        assert_eq!(report.total_records_checked, 2);
    }

    #[test]
    fn test_invalid_profile_and_orphaned_max() {
        let storage = SqliteStorage::open_memory().unwrap();
        // Written directly: the repository would reject this profile
        storage
            .conn()
            .execute(
                "INSERT INTO profiles (id, name, email, is_active, created_at, updated_at)
                 VALUES ('prof_bad', 'Bad', 'not-an-email', 1, 0, 0)",
                [],
            )
            .unwrap();
        storage
            .conn()
            .execute(
                "INSERT INTO max_logs (id, profile_id, exercise_id, weight_kg, reps, created_at, updated_at)
                 VALUES ('max_1', 'prof_nobody', 'ex_1', 100.0, 1, 0, 0)",
                [],
            )
            .unwrap();

        let report = validate_data_integrity(&storage).unwrap();

        assert_eq!(report.issues.len(), 2);
        assert!(report.issues[0].contains("prof_bad"));
        assert!(report.issues[1].contains("max_1"));
        assert_eq!(report.total_records_checked, 2);
    }
}
