//! Snapshot import.
//!
//! Records are applied kind by kind in dependency order. Every kind except
//! body metrics is split into chunks and each chunk runs in one storage
//! transaction; inside it every record is hydrated, validated and upserted
//! through the transaction-aware repository, so one bad record never aborts
//! its chunk. If a chunk's transaction fails as a whole, every record in it
//! counts as failed. Body metrics are saved one at a time, routed to weight
//! or height by the field they carry.
//!
//! When at least half of the records fail the import is reported as an
//! [`Error::ImportConflict`] instead of a partial success.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{
    Exercise, ExerciseTemplate, HeightEntry, MaxLog, Profile, TrainingPlan, WeightEntry,
    WorkoutLog,
};
use crate::storage::entity::{upsert_in, Entity, UpsertOutcome};
use crate::storage::events::EventType;
use crate::storage::sqlite::{MutationContext, SqliteStorage};
use crate::sync::chunker::chunk;
use crate::sync::progress::{ImportStatus, ProgressStatus, ProgressTracker};
use crate::sync::types::{
    ConflictDescriptor, EntityKind, Snapshot, CONFLICT_THRESHOLD, DEFAULT_CHUNK_SIZE,
    EXPORT_VERSION,
};

/// Importer for profile snapshots.
pub struct Importer<'a> {
    storage: &'a mut SqliteStorage,
    actor: String,
    chunk_size: usize,
}

impl<'a> Importer<'a> {
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

    /// Apply a snapshot to the store.
    ///
    /// # Errors
    ///
    /// Returns `ImportConflict` when the failure ratio reaches the conflict
    /// threshold, or a database error if the store itself is unusable.
    /// Individual record and chunk failures are folded into the status.
    pub fn import<F>(&mut self, snapshot: &Snapshot, on_progress: F) -> Result<ImportStatus>
    where
        F: FnMut(&ProgressStatus),
    {
        let total = snapshot.total_records();
        let mut tracker = ProgressTracker::new(total, on_progress);

        info!(total, version = %snapshot.version, "Starting import");

        if snapshot.version != EXPORT_VERSION {
            warn!(
                found = %snapshot.version,
                expected = EXPORT_VERSION,
                "Snapshot version mismatch, importing anyway"
            );
            tracker.warn(format!(
                "Snapshot version {} does not match expected version {EXPORT_VERSION}",
                snapshot.version
            ));
        }

        for kind in EntityKind::ALL {
            let records = snapshot.records(kind);
            match kind {
                EntityKind::BodyMetrics => self.import_body_metrics(records, &mut tracker),
                _ => {
                    for (index, batch) in chunk(records, self.chunk_size).enumerate() {
                        self.import_chunk(kind, index, batch, &mut tracker);
                    }
                }
            }
        }

        let status = tracker.complete();

        self.storage.mutate("import_snapshot", &self.actor, |_, ctx| {
            ctx.record_comment(
                "snapshot",
                &snapshot.exported_at,
                EventType::SnapshotImported,
                &format!(
                    "{} imported, {} failed",
                    status.successful_records, status.failed_records
                ),
            );
            Ok(())
        })?;

        info!(
            succeeded = status.successful_records,
            failed = status.failed_records,
            "Import complete"
        );

        if is_conflict(&status) {
            let message = format!(
                "{} of {} records failed to import",
                status.failed_records, status.total_records
            );
            return Err(Error::ImportConflict(ConflictDescriptor::from_errors(
                &message,
                &status.errors,
            )));
        }

        Ok(status)
    }

    /// Upsert one chunk inside one transaction.
    fn import_chunk<F>(
        &mut self,
        kind: EntityKind,
        index: usize,
        batch: &[serde_json::Value],
        tracker: &mut ProgressTracker<F>,
    ) where
        F: FnMut(&ProgressStatus),
    {
        let result = self
            .storage
            .mutate(&format!("import_{kind}"), &self.actor, |tx, ctx| {
                Ok(batch
                    .iter()
                    .map(|record| apply_record(tx, ctx, kind, record))
                    .collect::<Vec<_>>())
            });

        // Outcomes only count once the chunk has committed
        match result {
            Ok(outcomes) => {
                for outcome in outcomes {
                    match outcome {
                        Ok(()) => tracker.succeed(1),
                        Err(message) => {
                            warn!(kind = %kind, %message, "Record failed to import");
                            tracker.fail(message);
                        }
                    }
                }
            }
            Err(e) => {
                warn!(kind = %kind, chunk = index, error = %e, "Chunk failed to import");
                tracker.fail_many(
                    batch.len(),
                    format!("Failed to import {kind} chunk {index}: {e}"),
                );
            }
        }

        debug!(kind = %kind, chunk = index, records = batch.len(), "Imported chunk");
        tracker.emit();
    }

    /// Save body metrics one by one through the weight/height repository.
    fn import_body_metrics<F>(
        &mut self,
        records: &[serde_json::Value],
        tracker: &mut ProgressTracker<F>,
    ) where
        F: FnMut(&ProgressStatus),
    {
        for record in records {
            let result = match body_metric_kind(record) {
                Some(BodyMetricKind::Weight) => hydrate::<WeightEntry>(record)
                    .and_then(|entry| self.storage.save_weight(&entry, &self.actor)),
                Some(BodyMetricKind::Height) => hydrate::<HeightEntry>(record)
                    .and_then(|entry| self.storage.save_height(&entry, &self.actor)),
                None => Err(unknown_body_metric()),
            };

            match result {
                Ok(_) => tracker.succeed(1),
                Err(e) => {
                    let message = record_error(EntityKind::BodyMetrics, record, &e);
                    warn!(%message, "Body metric failed to import");
                    tracker.fail(message);
                }
            }
            tracker.emit();
        }
    }
}

/// Which body-metric shape a plain record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyMetricKind {
    Weight,
    Height,
}

/// Route a body-metric record by the first non-null `weight` or `height` field.
fn body_metric_kind(record: &serde_json::Value) -> Option<BodyMetricKind> {
    let carries = |field: &str| record.get(field).is_some_and(|v| !v.is_null());
    if carries("weight") {
        Some(BodyMetricKind::Weight)
    } else if carries("height") {
        Some(BodyMetricKind::Height)
    } else {
        None
    }
}

fn unknown_body_metric() -> Error {
    Error::InvalidArgument("unknown record type".to_string())
}

/// Whether a finished import crossed the conflict threshold.
#[allow(clippy::cast_precision_loss)]
fn is_conflict(status: &ProgressStatus) -> bool {
    if status.failed_records == 0 || status.total_records == 0 {
        return false;
    }
    let failure_rate = status.failed_records as f64 / status.total_records as f64;
    failure_rate >= CONFLICT_THRESHOLD
}

/// Hydrate, validate and upsert one record inside an open transaction.
///
/// Failures are returned as messages so they can be counted without
/// aborting the transaction.
fn apply_record(
    tx: &rusqlite::Connection,
    ctx: &mut MutationContext,
    kind: EntityKind,
    record: &serde_json::Value,
) -> std::result::Result<(), String> {
    let result = match kind {
        EntityKind::Profiles => upsert_plain::<Profile>(tx, ctx, record),
        EntityKind::Exercises => upsert_plain::<Exercise>(tx, ctx, record),
        EntityKind::ExerciseTemplates => upsert_plain::<ExerciseTemplate>(tx, ctx, record),
        EntityKind::TrainingPlans => upsert_plain::<TrainingPlan>(tx, ctx, record),
        EntityKind::WorkoutLogs => upsert_plain::<WorkoutLog>(tx, ctx, record),
        EntityKind::MaxLogs => upsert_plain::<MaxLog>(tx, ctx, record),
        EntityKind::BodyMetrics => match body_metric_kind(record) {
            Some(BodyMetricKind::Weight) => upsert_plain::<WeightEntry>(tx, ctx, record),
            Some(BodyMetricKind::Height) => upsert_plain::<HeightEntry>(tx, ctx, record),
            None => Err(unknown_body_metric()),
        },
    };
    result.map_err(|e| record_error(kind, record, &e))
}

fn upsert_plain<E: Entity>(
    tx: &rusqlite::Connection,
    ctx: &mut MutationContext,
    record: &serde_json::Value,
) -> Result<()> {
    let entity = hydrate::<E>(record)?;
    let outcome = upsert_in(tx, &entity)?;
    let event_type = match outcome {
        UpsertOutcome::Created => EventType::RecordCreated,
        UpsertOutcome::Updated => EventType::RecordUpdated,
    };
    ctx.record_event(E::LABEL, entity.id(), event_type);
    Ok(())
}

/// Turn a plain record into a validated model.
fn hydrate<E: Entity>(record: &serde_json::Value) -> Result<E> {
    let entity: E = serde_json::from_value(record.clone())?;
    let validation = entity.validate();
    if !validation.is_valid() {
        return Err(Error::InvalidArgument(validation.message()));
    }
    Ok(entity)
}

fn record_error(kind: EntityKind, record: &serde_json::Value, error: &Error) -> String {
    let id = record
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<no id>");
    format!("Failed to import {kind} record {id}: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::entity::count_in;
    use crate::sync::export::Exporter;

    /// 1 profile, 1 exercise, 1 workout log, 1 max log, 1 weight.
    fn five_unit_snapshot() -> Snapshot {
        let profile = Profile::new("Casey");
        let exercise = Exercise::new(&profile.id, "Deadlift");
        let log = WorkoutLog::new(&profile.id, "Pull day");
        let max = MaxLog::new(&profile.id, &exercise.id, 180.0);
        let weight = WeightEntry::new(&profile.id, 77.5);

        let mut snapshot = Snapshot::empty();
        snapshot.profiles.push(serde_json::to_value(&profile).unwrap());
        snapshot.exercises.push(serde_json::to_value(&exercise).unwrap());
        snapshot.workout_logs.push(serde_json::to_value(&log).unwrap());
        snapshot.max_logs.push(serde_json::to_value(&max).unwrap());
        snapshot.body_metrics.push(serde_json::to_value(&weight).unwrap());
        snapshot
    }

    fn fail_inserts(storage: &SqliteStorage, tables: &[&str]) {
        for table in tables {
            storage
                .conn()
                .execute_batch(&format!(
                    "CREATE TRIGGER fail_{table} BEFORE INSERT ON {table}
                     BEGIN SELECT RAISE(ABORT, '{table} is read-only'); END;"
                ))
                .unwrap();
        }
    }

    fn profiles_with_bad_rows(good: usize, bad: usize) -> Snapshot {
        let mut snapshot = Snapshot::empty();
        for i in 0..good {
            snapshot
                .profiles
                .push(serde_json::to_value(Profile::new(&format!("Good {i}"))).unwrap());
        }
        for i in 0..bad {
            // Missing required fields: fails hydration
            snapshot
                .profiles
                .push(serde_json::json!({"id": format!("prof_bad{i}")}));
        }
        snapshot
    }

    #[test]
    fn test_clean_import() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let snapshot = five_unit_snapshot();

        let status = Importer::new(&mut storage, "test")
            .import(&snapshot, |_| {})
            .unwrap();

        assert!(status.is_complete);
        assert_eq!(status.total_records, 5);
        assert_eq!(status.processed_records, 5);
        assert_eq!(status.successful_records, 5);
        assert_eq!(status.failed_records, 0);
        assert!(status.errors.is_empty());

        assert_eq!(count_in::<WeightEntry>(storage.conn(), None).unwrap(), 1);
        assert_eq!(count_in::<MaxLog>(storage.conn(), None).unwrap(), 1);
    }

    #[test]
    fn test_total_failure_is_conflict() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        fail_inserts(
            &storage,
            &["profiles", "exercises", "workout_logs", "max_logs", "body_metrics"],
        );

        let err = Importer::new(&mut storage, "test")
            .import(&five_unit_snapshot(), |_| {})
            .unwrap_err();

        let descriptor = err.conflict().expect("conflict error");
        assert_eq!(descriptor.conflicts.len(), 5);
        assert!(descriptor.message.contains("5 of 5"));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_exactly_half_failing_is_conflict() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let err = Importer::new(&mut storage, "test")
            .import(&profiles_with_bad_rows(2, 2), |_| {})
            .unwrap_err();

        assert!(matches!(err, Error::ImportConflict(_)));
        // Successful records in the same chunk are still committed
        assert_eq!(count_in::<Profile>(storage.conn(), None).unwrap(), 2);
    }

    #[test]
    fn test_one_fewer_failure_is_partial_success() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let status = Importer::new(&mut storage, "test")
            .import(&profiles_with_bad_rows(3, 1), |_| {})
            .unwrap();

        assert_eq!(status.failed_records, 1);
        assert_eq!(status.successful_records, 3);
        assert_eq!(status.errors.len(), 1);
        assert!(status.errors[0].contains("prof_bad0"));
    }

    #[test]
    fn test_accounting_and_progress_with_chunk_failure() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        // Exercise chunks fail when their audit events are written
        storage
            .conn()
            .execute_batch(
                "CREATE TRIGGER fail_exercise_events BEFORE INSERT ON events
                 WHEN NEW.entity_type = 'exercise'
                 BEGIN SELECT RAISE(ABORT, 'events unavailable'); END;",
            )
            .unwrap();

        let profile = Profile::new("Chunky");
        let mut snapshot = Snapshot::empty();
        snapshot.profiles.push(serde_json::to_value(&profile).unwrap());
        for i in 0..5 {
            let exercise = Exercise::new(&profile.id, &format!("Lift {i}"));
            snapshot.exercises.push(serde_json::to_value(&exercise).unwrap());
        }
        for i in 0..6 {
            let log = WorkoutLog::new(&profile.id, &format!("Day {i}"));
            snapshot.workout_logs.push(serde_json::to_value(&log).unwrap());
        }

        let mut seen: Vec<ProgressStatus> = Vec::new();
        let status = Importer::new(&mut storage, "test")
            .with_chunk_size(2)
            .import(&snapshot, |s| seen.push(s.clone()))
            .unwrap();

        assert_eq!(status.total_records, 12);
        assert_eq!(status.processed_records, 12);
        assert_eq!(
            status.successful_records + status.failed_records,
            status.processed_records
        );
        assert_eq!(status.failed_records, 5);
        // One message per failed chunk of exercises (2 + 2 + 1)
        assert_eq!(status.errors.len(), 3);
        assert_eq!(count_in::<Exercise>(storage.conn(), None).unwrap(), 0);

        assert!(seen
            .windows(2)
            .all(|w| w[0].processed_records <= w[1].processed_records));
        assert_eq!(seen.iter().filter(|s| s.is_complete).count(), 1);
        assert!(seen.last().unwrap().is_complete);
    }

    #[test]
    fn test_version_mismatch_warns_and_continues() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut snapshot = five_unit_snapshot();
        snapshot.version = "0.9.0".to_string();

        let status = Importer::new(&mut storage, "test")
            .import(&snapshot, |_| {})
            .unwrap();

        assert_eq!(status.successful_records, 5);
        assert_eq!(status.errors.len(), 1);
        assert!(status.errors[0].contains("0.9.0"));
    }

    #[test]
    fn test_unknown_body_metric_fails() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut snapshot = five_unit_snapshot();
        snapshot
            .body_metrics
            .push(serde_json::json!({"id": "bm_odd", "profileId": "p", "bodyFat": 12.0}));

        let status = Importer::new(&mut storage, "test")
            .import(&snapshot, |_| {})
            .unwrap();

        assert_eq!(status.failed_records, 1);
        assert!(status.errors[0].contains("unknown record type"));
    }

    #[test]
    fn test_null_weight_routes_to_height() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let profile = Profile::new("Sam");
        let mut height = serde_json::to_value(HeightEntry::new(&profile.id, 181.0)).unwrap();
        height["weight"] = serde_json::Value::Null;

        let mut snapshot = Snapshot::empty();
        snapshot.profiles.push(serde_json::to_value(&profile).unwrap());
        snapshot.body_metrics.push(height);

        let status = Importer::new(&mut storage, "test")
            .import(&snapshot, |_| {})
            .unwrap();

        assert_eq!(status.successful_records, 2);
        assert_eq!(status.failed_records, 0);
        assert_eq!(storage.height_history(&profile.id).unwrap().len(), 1);
        assert!(storage.weight_history(&profile.id).unwrap().is_empty());
    }

    #[test]
    fn test_body_metric_routing_ignores_null_fields() {
        let weight = serde_json::json!({"weight": 80.0, "height": null});
        let height = serde_json::json!({"weight": null, "height": 175.0});
        let neither = serde_json::json!({"weight": null, "height": null});

        assert_eq!(body_metric_kind(&weight), Some(BodyMetricKind::Weight));
        assert_eq!(body_metric_kind(&height), Some(BodyMetricKind::Height));
        assert_eq!(body_metric_kind(&neither), None);
    }

    #[test]
    fn test_apply_record_routes_body_metrics() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let profile = Profile::new("Lee");
        let weight = serde_json::to_value(WeightEntry::new(&profile.id, 70.0)).unwrap();
        let mut height = serde_json::to_value(HeightEntry::new(&profile.id, 170.0)).unwrap();
        height["weight"] = serde_json::Value::Null;
        let neither = serde_json::json!({"id": "bm_none", "profileId": profile.id});

        let outcomes = storage
            .mutate("apply_body_metrics", "test", |tx, ctx| {
                Ok([&weight, &height, &neither]
                    .into_iter()
                    .map(|record| apply_record(tx, ctx, EntityKind::BodyMetrics, record))
                    .collect::<Vec<_>>())
            })
            .unwrap();

        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_ok());
        assert!(outcomes[2].as_ref().unwrap_err().contains("unknown record type"));
        assert_eq!(count_in::<WeightEntry>(storage.conn(), None).unwrap(), 1);
        assert_eq!(count_in::<HeightEntry>(storage.conn(), None).unwrap(), 1);
    }

    #[test]
    fn test_body_metrics_emit_per_record() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut snapshot = Snapshot::empty();
        let mut owner = String::new();
        for i in 0..3 {
            let profile = Profile::new(&format!("Lifter {i}"));
            owner.clone_from(&profile.id);
            snapshot.profiles.push(serde_json::to_value(&profile).unwrap());
        }
        snapshot
            .body_metrics
            .push(serde_json::to_value(WeightEntry::new(&owner, 82.0)).unwrap());
        snapshot
            .body_metrics
            .push(serde_json::to_value(HeightEntry::new(&owner, 180.0)).unwrap());
        snapshot
            .body_metrics
            .push(serde_json::json!({"id": "bm_odd", "profileId": owner, "bodyFat": 14.0}));

        let mut seen: Vec<ProgressStatus> = Vec::new();
        let status = Importer::new(&mut storage, "test")
            .with_chunk_size(2)
            .import(&snapshot, |s| seen.push(s.clone()))
            .unwrap();

        assert_eq!(status.total_records, 6);
        assert_eq!(status.successful_records, 5);
        assert_eq!(status.failed_records, 1);

        // Two profile chunks, one emit per body metric, then completion
        assert_eq!(seen.len(), 2 + 3 + 1);
        let processed: Vec<usize> = seen.iter().map(|s| s.processed_records).collect();
        assert_eq!(processed, vec![2, 3, 4, 5, 6, 6]);
        assert!(seen[..seen.len() - 1].iter().all(|s| !s.is_complete));
        assert!(seen.last().unwrap().is_complete);
    }

    #[test]
    fn test_reimport_updates_existing_records() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let snapshot = five_unit_snapshot();
        Importer::new(&mut storage, "test")
            .import(&snapshot, |_| {})
            .unwrap();

        let mut renamed = snapshot.clone();
        renamed.profiles[0]["name"] = serde_json::json!("Casey R.");
        let status = Importer::new(&mut storage, "test")
            .import(&renamed, |_| {})
            .unwrap();

        assert_eq!(status.successful_records, 5);
        let profiles: Vec<Profile> = storage.find_all(None).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Casey R.");
    }

    #[test]
    fn test_round_trip_restores_counts() {
        let mut source = SqliteStorage::open_memory().unwrap();
        let profile = Profile::new("Robin");
        source.save(&profile, "test").unwrap();
        let bench = Exercise::new(&profile.id, "Bench");
        source.save(&bench, "test").unwrap();
        source
            .save(&ExerciseTemplate::new(&profile.id, &bench.id, "Bench 5x5", 5), "test")
            .unwrap();
        source
            .save(&TrainingPlan::new(&profile.id, "Strength"), "test")
            .unwrap();
        source
            .save(&WorkoutLog::new(&profile.id, "Monday"), "test")
            .unwrap();
        source
            .save(&MaxLog::new(&profile.id, &bench.id, 100.0), "test")
            .unwrap();
        source
            .save_weight(&WeightEntry::new(&profile.id, 90.0), "test")
            .unwrap();
        source
            .save_height(&HeightEntry::new(&profile.id, 185.0), "test")
            .unwrap();

        let snapshot = Exporter::new(&source).export(&profile.id, |_| {}).unwrap();

        let mut target = SqliteStorage::open_memory().unwrap();
        Importer::new(&mut target, "test")
            .import(&snapshot, |_| {})
            .unwrap();

        let restored = Exporter::new(&target).export(&profile.id, |_| {}).unwrap();
        for kind in EntityKind::ALL {
            assert_eq!(
                restored.records(kind),
                snapshot.records(kind),
                "{kind} differs after round trip"
            );
        }
    }
}
