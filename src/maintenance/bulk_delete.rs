//! Bulk deletion strategies.
//!
//! Record deletions happen in chunks, one transaction per chunk. A record
//! that fails to delete is reported and skipped; a chunk whose transaction
//! fails reports every record in it. Neither stops the run. Only a failure
//! to enumerate what should be deleted aborts the operation.

use std::collections::BTreeMap;

use chrono::{Months, Utc};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::maintenance::types::{BulkDeleteOption, CleanupResult};
use crate::model::{
    Exercise, ExerciseTemplate, HeightEntry, MaxLog, Profile, TrainingPlan, WeightEntry,
    WorkoutLog,
};
use crate::storage::entity::{delete_in, list_in, Entity};
use crate::storage::events::EventType;
use crate::storage::sqlite::SqliteStorage;
use crate::sync::{chunk, EntityKind, ProgressStatus, ProgressTracker, DEFAULT_CHUNK_SIZE};

/// Workout logs and max logs older than this many months are "old data".
pub const RETENTION_MONTHS: u32 = 24;

/// Runs bulk-delete strategies against a store.
pub struct BulkDeleter<'a> {
    storage: &'a mut SqliteStorage,
    actor: String,
    chunk_size: usize,
}

impl<'a> BulkDeleter<'a> {
    #[must_use]
    pub fn new(storage: &'a mut SqliteStorage, actor: &str) -> Self {
        Self {
            storage,
            actor: actor.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a different chunk size. Zero is treated as the default.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        self
    }

    /// Parse `option` and run it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unrecognized option, before anything
    /// is deleted.
    pub fn run_named<F>(&mut self, option: &str, on_progress: F) -> Result<CleanupResult>
    where
        F: FnMut(&ProgressStatus),
    {
        let option: BulkDeleteOption = option.parse()?;
        self.run(option, on_progress)
    }

    /// Run one bulk-delete strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if the records to delete cannot be enumerated.
    /// Individual deletion failures are collected in the result.
    pub fn run<F>(&mut self, option: BulkDeleteOption, on_progress: F) -> Result<CleanupResult>
    where
        F: FnMut(&ProgressStatus),
    {
        info!(option = %option, "Starting bulk delete");

        let mut result = match option {
            BulkDeleteOption::All => self.delete_all(on_progress)?,
            BulkDeleteOption::OldData => self.delete_old_data(on_progress)?,
            BulkDeleteOption::InactiveProfiles => self.delete_inactive_profiles(on_progress)?,
        };
        result.finish();

        let summary = format!("{option}: {} deleted", result.total_deleted);
        self.storage.mutate("bulk_delete", &self.actor, |_, ctx| {
            ctx.record_comment("database", option.as_str(), EventType::BulkDeleteCompleted, &summary);
            Ok(())
        })?;

        info!(
            option = %option,
            deleted = result.total_deleted,
            errors = result.errors.len(),
            "Bulk delete complete"
        );
        Ok(result)
    }

    fn delete_all<F>(&mut self, on_progress: F) -> Result<CleanupResult>
    where
        F: FnMut(&ProgressStatus),
    {
        let (targets, body_metrics) = self.storage.read(|conn| {
            let profiles = list_in::<Profile>(conn, None)?;
            // Grouped by owner id; includes owners with no profile row
            let mut body_metrics: BTreeMap<String, usize> = BTreeMap::new();
            for entry in list_in::<WeightEntry>(conn, None)? {
                *body_metrics.entry(entry.profile_id).or_default() += 1;
            }
            for entry in list_in::<HeightEntry>(conn, None)? {
                *body_metrics.entry(entry.profile_id).or_default() += 1;
            }
            let targets = [
                (EntityKind::WorkoutLogs, ids::<WorkoutLog>(conn)?),
                (EntityKind::MaxLogs, ids::<MaxLog>(conn)?),
                (EntityKind::TrainingPlans, ids::<TrainingPlan>(conn)?),
                (EntityKind::Exercises, ids::<Exercise>(conn)?),
                (EntityKind::ExerciseTemplates, ids::<ExerciseTemplate>(conn)?),
                (
                    EntityKind::Profiles,
                    profiles.into_iter().map(|p| p.id).collect(),
                ),
            ];
            Ok((targets, body_metrics))
        })?;

        let total = targets.iter().map(|(_, ids)| ids.len()).sum::<usize>()
            + body_metrics.iter().map(|(_, count)| count).sum::<usize>();
        let mut tracker = ProgressTracker::new(total, on_progress);
        let mut result = CleanupResult::default();

        for (kind, ids) in &targets {
            match kind {
                EntityKind::WorkoutLogs => {
                    self.delete_chunked::<WorkoutLog, F>(*kind, ids, &mut result, &mut tracker);
                }
                EntityKind::MaxLogs => {
                    self.delete_chunked::<MaxLog, F>(*kind, ids, &mut result, &mut tracker);
                }
                EntityKind::TrainingPlans => {
                    self.delete_chunked::<TrainingPlan, F>(*kind, ids, &mut result, &mut tracker);
                }
                EntityKind::Exercises => {
                    self.delete_chunked::<Exercise, F>(*kind, ids, &mut result, &mut tracker);
                }
                EntityKind::ExerciseTemplates => {
                    self.delete_chunked::<ExerciseTemplate, F>(
                        *kind,
                        ids,
                        &mut result,
                        &mut tracker,
                    );
                }
                EntityKind::Profiles => {
                    self.delete_chunked::<Profile, F>(*kind, ids, &mut result, &mut tracker);
                }
                EntityKind::BodyMetrics => {}
            }
        }

        for (profile_id, expected) in &body_metrics {
            self.delete_body_metrics(profile_id, *expected, &mut result, &mut tracker);
        }

        result.errors = tracker.complete().errors;
        Ok(result)
    }

    fn delete_old_data<F>(&mut self, on_progress: F) -> Result<CleanupResult>
    where
        F: FnMut(&ProgressStatus),
    {
        let cutoff = retention_cutoff();
        debug!(cutoff, "Computed retention cutoff");

        let is_old = |at: Option<i64>| at.is_some_and(|t| t < cutoff);
        let (old_logs, old_maxes) = self.storage.read(|conn| {
            let logs: Vec<String> = list_in::<WorkoutLog>(conn, None)?
                .into_iter()
                .filter(|log| is_old(log.start_time))
                .map(|log| log.id)
                .collect();
            let maxes: Vec<String> = list_in::<MaxLog>(conn, None)?
                .into_iter()
                .filter(|max| is_old(max.date))
                .map(|max| max.id)
                .collect();
            Ok((logs, maxes))
        })?;

        let mut tracker = ProgressTracker::new(old_logs.len() + old_maxes.len(), on_progress);
        let mut result = CleanupResult::default();

        self.delete_chunked::<WorkoutLog, F>(
            EntityKind::WorkoutLogs,
            &old_logs,
            &mut result,
            &mut tracker,
        );
        self.delete_chunked::<MaxLog, F>(EntityKind::MaxLogs, &old_maxes, &mut result, &mut tracker);

        result.errors = tracker.complete().errors;
        Ok(result)
    }

    fn delete_inactive_profiles<F>(&mut self, on_progress: F) -> Result<CleanupResult>
    where
        F: FnMut(&ProgressStatus),
    {
        let inactive: Vec<Profile> = self
            .storage
            .find_all::<Profile>(None)?
            .into_iter()
            .filter(|profile| !profile.is_active)
            .collect();

        let mut tracker = ProgressTracker::new(inactive.len(), on_progress);
        let mut result = CleanupResult::default();

        for profile in &inactive {
            let outcome = self
                .storage
                .mutate("delete_inactive_profile", &self.actor, |tx, ctx| {
                    let mut removed = CleanupResult::default();
                    removed.add(EntityKind::WorkoutLogs, delete_owned::<WorkoutLog>(tx, &profile.id)?);
                    removed.add(EntityKind::MaxLogs, delete_owned::<MaxLog>(tx, &profile.id)?);
                    removed.add(
                        EntityKind::TrainingPlans,
                        delete_owned::<TrainingPlan>(tx, &profile.id)?,
                    );
                    removed.add(
                        EntityKind::BodyMetrics,
                        delete_owned::<WeightEntry>(tx, &profile.id)?
                            + delete_owned::<HeightEntry>(tx, &profile.id)?,
                    );
                    if delete_in::<Profile>(tx, &profile.id)? {
                        removed.add(EntityKind::Profiles, 1);
                    }
                    ctx.record_event(Profile::LABEL, &profile.id, EventType::RecordDeleted);
                    Ok(removed)
                });

            match outcome {
                Ok(removed) => {
                    for kind in EntityKind::ALL {
                        result.add(kind, count_of(&removed, kind));
                    }
                    tracker.succeed(1);
                }
                Err(e) => {
                    warn!(profile_id = %profile.id, error = %e, "Failed to delete inactive profile");
                    tracker.fail(format!(
                        "Failed to delete inactive profile {}: {e}",
                        profile.id
                    ));
                }
            }
            tracker.emit();
        }

        result.errors = tracker.complete().errors;
        Ok(result)
    }

    /// Delete `ids` in chunks, one transaction per chunk.
    fn delete_chunked<E, F>(
        &mut self,
        kind: EntityKind,
        ids: &[String],
        result: &mut CleanupResult,
        tracker: &mut ProgressTracker<F>,
    ) where
        E: Entity,
        F: FnMut(&ProgressStatus),
    {
        for (index, batch) in chunk(ids, self.chunk_size).enumerate() {
            let outcome = self
                .storage
                .mutate(&format!("bulk_delete_{}", E::LABEL), &self.actor, |tx, _ctx| {
                    let mut deleted = 0;
                    let mut failures = Vec::new();
                    for id in batch {
                        match delete_in::<E>(tx, id) {
                            Ok(true) => deleted += 1,
                            Ok(false) => {}
                            Err(e) => failures.push(format!("Failed to delete {} {id}: {e}", E::LABEL)),
                        }
                    }
                    Ok((deleted, failures))
                });

            match outcome {
                Ok((deleted, failures)) => {
                    result.add(kind, deleted);
                    tracker.succeed(batch.len() - failures.len());
                    for failure in failures {
                        warn!(kind = %kind, %failure, "Record failed to delete");
                        tracker.fail(failure);
                    }
                }
                Err(e) => {
                    warn!(kind = %kind, chunk = index, error = %e, "Chunk failed to delete");
                    tracker.fail_many(
                        batch.len(),
                        format!("Failed to delete {kind} chunk {index}: {e}"),
                    );
                }
            }
            tracker.emit();
        }
    }

    /// Delete one profile's weight and height history in one transaction.
    fn delete_body_metrics<F>(
        &mut self,
        profile_id: &str,
        expected: usize,
        result: &mut CleanupResult,
        tracker: &mut ProgressTracker<F>,
    ) where
        F: FnMut(&ProgressStatus),
    {
        let outcome = self
            .storage
            .mutate("bulk_delete_body_metrics", &self.actor, |tx, _ctx| {
                Ok(delete_owned::<WeightEntry>(tx, profile_id)?
                    + delete_owned::<HeightEntry>(tx, profile_id)?)
            });

        match outcome {
            Ok(deleted) => {
                result.add(EntityKind::BodyMetrics, deleted);
                tracker.succeed(expected);
            }
            Err(e) => {
                warn!(profile_id, error = %e, "Failed to delete body metrics");
                tracker.fail_many(expected, format!(
                    "Failed to delete body metrics for profile {profile_id}: {e}"
                ));
            }
        }
        tracker.emit();
    }
}

/// Start of the retention window, in Unix milliseconds.
#[must_use]
pub fn retention_cutoff() -> i64 {
    let now = Utc::now();
    now.checked_sub_months(Months::new(RETENTION_MONTHS))
        .unwrap_or(now)
        .timestamp_millis()
}

fn ids<E: Entity>(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<String>> {
    Ok(list_in::<E>(conn, None)?
        .iter()
        .map(|record| record.id().to_string())
        .collect())
}

/// Delete every record of `E` owned by one profile.
fn delete_owned<E: Entity>(conn: &rusqlite::Connection, profile_id: &str) -> rusqlite::Result<usize> {
    let mut deleted = 0;
    for record in list_in::<E>(conn, Some(profile_id))? {
        if delete_in::<E>(conn, record.id())? {
            deleted += 1;
        }
    }
    Ok(deleted)
}

fn count_of(result: &CleanupResult, kind: EntityKind) -> usize {
    match kind {
        EntityKind::Profiles => result.profiles,
        EntityKind::Exercises => result.exercises,
        EntityKind::ExerciseTemplates => result.exercise_templates,
        EntityKind::TrainingPlans => result.training_plans,
        EntityKind::WorkoutLogs => result.workout_logs,
        EntityKind::MaxLogs => result.max_logs,
        EntityKind::BodyMetrics => result.body_metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::events::get_events_by_type;

    const DAY_MS: i64 = 86_400_000;

    fn days_ago(days: i64) -> i64 {
        Utc::now().timestamp_millis() - days * DAY_MS
    }

    fn seed_profile(storage: &mut SqliteStorage, name: &str, active: bool) -> Profile {
        let profile = Profile::new(name).with_active(active);
        storage.save(&profile, "test").unwrap();
        let exercise = Exercise::new(&profile.id, "Press");
        storage.save(&exercise, "test").unwrap();
        storage
            .save(
                &ExerciseTemplate::new(&profile.id, &exercise.id, "Press 3x8", 3),
                "test",
            )
            .unwrap();
        storage
            .save(&TrainingPlan::new(&profile.id, "Plan"), "test")
            .unwrap();
        storage
            .save(&WorkoutLog::new(&profile.id, "Log"), "test")
            .unwrap();
        storage
            .save(&MaxLog::new(&profile.id, &exercise.id, 60.0), "test")
            .unwrap();
        storage
            .save_weight(&WeightEntry::new(&profile.id, 70.0), "test")
            .unwrap();
        storage
            .save_height(&HeightEntry::new(&profile.id, 175.0), "test")
            .unwrap();
        profile
    }

    #[test]
    fn test_delete_all() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        seed_profile(&mut storage, "One", true);
        seed_profile(&mut storage, "Two", false);

        let mut seen = Vec::new();
        let result = BulkDeleter::new(&mut storage, "test")
            .with_chunk_size(1)
            .run(BulkDeleteOption::All, |s| seen.push(s.clone()))
            .unwrap();

        assert_eq!(result.profiles, 2);
        assert_eq!(result.exercises, 2);
        assert_eq!(result.exercise_templates, 2);
        assert_eq!(result.training_plans, 2);
        assert_eq!(result.workout_logs, 2);
        assert_eq!(result.max_logs, 2);
        assert_eq!(result.body_metrics, 4);
        assert_eq!(result.total_deleted, 16);
        assert!(result.errors.is_empty());

        assert_eq!(storage.store_counts().unwrap().total(), 0);
        let last = seen.last().unwrap();
        assert!(last.is_complete);
        assert_eq!(last.processed_records, 16);

        let events = get_events_by_type(storage.conn(), EventType::BulkDeleteCompleted, None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].comment.as_deref(), Some("ALL: 16 deleted"));
    }

    #[test]
    fn test_all_removes_orphaned_records() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.save(&Profile::new("Present"), "test").unwrap();
        storage
            .save(&WorkoutLog::new("prof_gone", "Leftover"), "test")
            .unwrap();
        storage
            .save_weight(&WeightEntry::new("prof_gone", 90.0), "test")
            .unwrap();

        let mut seen = Vec::new();
        let result = BulkDeleter::new(&mut storage, "test")
            .run(BulkDeleteOption::All, |s| seen.push(s.clone()))
            .unwrap();

        assert_eq!(result.profiles, 1);
        assert_eq!(result.workout_logs, 1);
        assert_eq!(result.body_metrics, 1);
        assert_eq!(result.total_deleted, 3);
        assert!(result.errors.is_empty());

        let counts = storage.store_counts().unwrap();
        assert_eq!(counts.workout_logs, 0);
        assert_eq!(counts.body_metrics, 0);
        assert_eq!(counts.total(), 0);
        assert_eq!(seen.last().unwrap().processed_records, 3);
    }

    #[test]
    fn test_old_data_is_selective() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let profile = Profile::new("Veteran");
        storage.save(&profile, "test").unwrap();

        let ancient = WorkoutLog::new(&profile.id, "Ancient").started_at(Some(days_ago(800)));
        let recent = WorkoutLog::new(&profile.id, "Recent").started_at(Some(days_ago(30)));
        let undated = WorkoutLog::new(&profile.id, "Undated").started_at(None);
        let old_max = MaxLog::new(&profile.id, "ex_1", 100.0).dated(Some(days_ago(1000)));
        let new_max = MaxLog::new(&profile.id, "ex_1", 110.0).dated(Some(days_ago(10)));
        for log in [&ancient, &recent, &undated] {
            storage.save(log, "test").unwrap();
        }
        storage.save(&old_max, "test").unwrap();
        storage.save(&new_max, "test").unwrap();

        let result = BulkDeleter::new(&mut storage, "test")
            .run(BulkDeleteOption::OldData, |_| {})
            .unwrap();

        assert_eq!(result.workout_logs, 1);
        assert_eq!(result.max_logs, 1);
        assert_eq!(result.total_deleted, 2);

        assert!(storage.find::<WorkoutLog>(&ancient.id).unwrap().is_none());
        assert!(storage.find::<WorkoutLog>(&recent.id).unwrap().is_some());
        assert!(storage.find::<WorkoutLog>(&undated.id).unwrap().is_some());
        assert!(storage.find::<MaxLog>(&old_max.id).unwrap().is_none());
        assert!(storage.find::<MaxLog>(&new_max.id).unwrap().is_some());
        assert!(storage.find::<Profile>(&profile.id).unwrap().is_some());
    }

    #[test]
    fn test_inactive_profiles_only() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let active = seed_profile(&mut storage, "Active", true);
        let inactive = seed_profile(&mut storage, "Inactive", false);

        let result = BulkDeleter::new(&mut storage, "test")
            .run(BulkDeleteOption::InactiveProfiles, |_| {})
            .unwrap();

        assert_eq!(result.profiles, 1);
        assert_eq!(result.workout_logs, 1);
        assert_eq!(result.max_logs, 1);
        assert_eq!(result.training_plans, 1);
        assert_eq!(result.body_metrics, 2);
        assert_eq!(result.total_deleted, 6);

        assert!(storage.find::<Profile>(&inactive.id).unwrap().is_none());
        assert!(storage.find::<Profile>(&active.id).unwrap().is_some());
        assert_eq!(storage.count::<WorkoutLog>(Some(&active.id)).unwrap(), 1);
    }

    #[test]
    fn test_inactive_profile_failure_does_not_block_others() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let stuck = seed_profile(&mut storage, "Stuck", false);
        let gone = seed_profile(&mut storage, "Gone", false);
        storage
            .conn()
            .execute_batch(&format!(
                "CREATE TRIGGER keep_stuck BEFORE DELETE ON profiles WHEN OLD.id = '{}'
                 BEGIN SELECT RAISE(ABORT, 'profile is locked'); END;",
                stuck.id
            ))
            .unwrap();

        let result = BulkDeleter::new(&mut storage, "test")
            .run(BulkDeleteOption::InactiveProfiles, |_| {})
            .unwrap();

        assert_eq!(result.profiles, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains(&stuck.id));
        assert!(storage.find::<Profile>(&gone.id).unwrap().is_none());
        // The failed profile's history rolled back with it
        assert_eq!(storage.count::<WorkoutLog>(Some(&stuck.id)).unwrap(), 1);
    }

    #[test]
    fn test_record_failure_is_collected() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let profile = seed_profile(&mut storage, "Pinned", true);
        let pinned = WorkoutLog::new(&profile.id, "Pinned");
        storage.save(&pinned, "test").unwrap();
        storage
            .conn()
            .execute_batch(&format!(
                "CREATE TRIGGER pin_log BEFORE DELETE ON workout_logs WHEN OLD.id = '{}'
                 BEGIN SELECT RAISE(ABORT, 'pinned'); END;",
                pinned.id
            ))
            .unwrap();

        let result = BulkDeleter::new(&mut storage, "test")
            .run(BulkDeleteOption::All, |_| {})
            .unwrap();

        assert_eq!(result.workout_logs, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains(&pinned.id));
        assert_eq!(result.profiles, 1);
    }

    #[test]
    fn test_invalid_option_deletes_nothing() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        seed_profile(&mut storage, "Safe", true);
        let before = storage.store_counts().unwrap().total();
        let mut emits = 0;

        let err = BulkDeleter::new(&mut storage, "test")
            .run_named("INVALID_OPTION", |_| emits += 1)
            .unwrap_err();

        assert!(err.to_string().contains("Invalid bulk delete option"));
        assert_eq!(emits, 0);
        assert_eq!(storage.store_counts().unwrap().total(), before);
        assert!(get_events_by_type(storage.conn(), EventType::BulkDeleteCompleted, None)
            .unwrap()
            .is_empty());
    }
}
