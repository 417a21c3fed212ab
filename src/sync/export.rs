//! Snapshot export.
//!
//! The exporter reads every collection for one profile inside a single read
//! transaction, so the snapshot is a consistent view even if another process
//! writes concurrently. It then walks the kinds in a fixed order, appending
//! records chunk by chunk and reporting progress after each chunk.
//!
//! Export has no side effects on the store.

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{
    Exercise, ExerciseTemplate, HeightEntry, MaxLog, Profile, TrainingPlan, WeightEntry,
    WorkoutLog,
};
use crate::storage::entity::{list_in, Entity};
use crate::storage::sqlite::SqliteStorage;
use crate::sync::chunker::chunk;
use crate::sync::progress::{ProgressStatus, ProgressTracker};
use crate::sync::types::{EntityKind, Snapshot, DEFAULT_CHUNK_SIZE};

/// Exporter for profile snapshots.
pub struct Exporter<'a> {
    storage: &'a SqliteStorage,
    chunk_size: usize,
}

impl<'a> Exporter<'a> {
    #[must_use]
    pub fn new(storage: &'a SqliteStorage) -> Self {
        Self {
            storage,
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

    /// Export everything owned by `profile_id`.
    ///
    /// A profile id with no data yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch or serialization fails. Progress already
    /// reported is not retracted.
    pub fn export<F>(&self, profile_id: &str, on_progress: F) -> Result<Snapshot>
    where
        F: FnMut(&ProgressStatus),
    {
        let collections = self.fetch_all(profile_id)?;
        let total: usize = collections.iter().map(|(_, records)| records.len()).sum();

        info!(profile_id, total, "Starting export");

        let mut snapshot = Snapshot::empty();
        let mut tracker = ProgressTracker::new(total, on_progress);

        for (kind, records) in &collections {
            for (index, batch) in chunk(records, self.chunk_size).enumerate() {
                snapshot.records_mut(*kind).extend_from_slice(batch);
                tracker.succeed(batch.len());
                debug!(kind = %kind, chunk = index, records = batch.len(), "Exported chunk");
                tracker.emit();
            }
        }

        let status = tracker.complete();
        info!(profile_id, exported = status.processed_records, "Export complete");

        Ok(snapshot)
    }

    /// Fetch every kind as plain records, in snapshot order.
    fn fetch_all(&self, profile_id: &str) -> Result<Vec<(EntityKind, Vec<serde_json::Value>)>> {
        self.storage.read(|conn| {
            let mut body_metrics = plain::<WeightEntry>(conn, profile_id)?;
            body_metrics.extend(plain::<HeightEntry>(conn, profile_id)?);

            let mut collections = Vec::with_capacity(EntityKind::ALL.len());
            for kind in EntityKind::ALL {
                let records = match kind {
                    EntityKind::Profiles => plain::<Profile>(conn, profile_id)?,
                    EntityKind::Exercises => plain::<Exercise>(conn, profile_id)?,
                    EntityKind::ExerciseTemplates => plain::<ExerciseTemplate>(conn, profile_id)?,
                    EntityKind::TrainingPlans => plain::<TrainingPlan>(conn, profile_id)?,
                    EntityKind::WorkoutLogs => plain::<WorkoutLog>(conn, profile_id)?,
                    EntityKind::MaxLogs => plain::<MaxLog>(conn, profile_id)?,
                    EntityKind::BodyMetrics => std::mem::take(&mut body_metrics),
                };
                collections.push((kind, records));
            }
            Ok(collections)
        })
    }
}

fn plain<E: Entity>(
    conn: &rusqlite::Connection,
    profile_id: &str,
) -> Result<Vec<serde_json::Value>> {
    list_in::<E>(conn, Some(profile_id))?
        .iter()
        .map(|record| serde_json::to_value(record).map_err(Into::into))
        .collect()
}
