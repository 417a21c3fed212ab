//! SQLite storage implementation.
//!
//! This module provides the main storage backend for Liftlog using SQLite.
//! It follows the MutationContext pattern for transaction discipline and audit logging.

use crate::error::{Error, Result};
use crate::model::{
    Exercise, ExerciseTemplate, HeightEntry, MaxLog, Profile, TrainingPlan, WeightEntry,
    WorkoutLog, WorkoutSession,
};
use crate::storage::entity::{
    count_in, delete_in, find_in, list_in, upsert_in, Entity, UpsertOutcome,
};
use crate::storage::events::{insert_event, Event, EventType};
use crate::storage::schema::apply_schema;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Duration;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, tracking side effects.
///
/// Passed to mutation closures to record audit events, which are written
/// just before the transaction commits.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Actor performing the operation.
    pub actor: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    /// Create a new mutation context.
    #[must_use]
    pub fn new(op_name: &str, actor: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            actor: actor.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an event for this operation.
    pub fn record_event(&mut self, entity_type: &str, entity_id: &str, event_type: EventType) {
        self.events
            .push(Event::new(entity_type, entity_id, event_type, &self.actor));
    }

    /// Record an event carrying a free-form comment.
    pub fn record_comment(
        &mut self,
        entity_type: &str,
        entity_id: &str,
        event_type: EventType,
        comment: &str,
    ) {
        self.events.push(
            Event::new(entity_type, entity_id, event_type, &self.actor).with_comment(comment),
        );
    }
}

/// Record counts per table.
///
/// Returned by `store_counts` for the status command.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub profiles: usize,
    pub exercises: usize,
    pub exercise_templates: usize,
    pub training_plans: usize,
    pub workout_sessions: usize,
    pub workout_logs: usize,
    pub max_logs: usize,
    /// Weight and height entries together.
    pub body_metrics: usize,
}

impl StoreCounts {
    /// Returns total number of records.
    #[must_use]
    pub fn total(&self) -> usize {
        self.profiles
            + self.exercises
            + self.exercise_templates
            + self.training_plans
            + self.workout_sessions
            + self.workout_logs
            + self.max_logs
            + self.body_metrics
    }
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// This method:
    /// 1. Begins an IMMEDIATE transaction (for write locking)
    /// 2. Executes the mutation closure
    /// 3. Writes audit events
    /// 4. Commits (or rolls back on error)
    ///
    /// If the closure panics, the transaction is dropped and rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op, actor);

        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;

        Ok(result)
    }

    /// Run several reads against one consistent view of the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be opened or the closure fails.
    pub fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    // ==================
    // Repository Operations
    // ==================

    /// Validate and upsert a record, recording a created/updated event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if validation fails, or a database error.
    pub fn save<E: Entity>(&mut self, entity: &E, actor: &str) -> Result<UpsertOutcome> {
        let validation = entity.validate();
        if !validation.is_valid() {
            return Err(Error::InvalidArgument(format!(
                "Invalid {}: {}",
                E::LABEL,
                validation.message()
            )));
        }

        self.mutate(&format!("save_{}", E::LABEL), actor, |tx, ctx| {
            let outcome = upsert_in(tx, entity)?;
            let event_type = match outcome {
                UpsertOutcome::Created => EventType::RecordCreated,
                UpsertOutcome::Updated => EventType::RecordUpdated,
            };
            ctx.record_event(E::LABEL, entity.id(), event_type);
            Ok(outcome)
        })
    }

    /// Find a record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find<E: Entity>(&self, id: &str) -> Result<Option<E>> {
        Ok(find_in(&self.conn, id)?)
    }

    /// List records, optionally scoped to one profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_all<E: Entity>(&self, profile_id: Option<&str>) -> Result<Vec<E>> {
        Ok(list_in(&self.conn, profile_id)?)
    }

    /// Delete a record by ID. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete<E: Entity>(&mut self, id: &str, actor: &str) -> Result<bool> {
        self.mutate(&format!("delete_{}", E::LABEL), actor, |tx, ctx| {
            let deleted = delete_in::<E>(tx, id)?;
            if deleted {
                ctx.record_event(E::LABEL, id, EventType::RecordDeleted);
            }
            Ok(deleted)
        })
    }

    /// Count records, optionally scoped to one profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count<E: Entity>(&self, profile_id: Option<&str>) -> Result<usize> {
        Ok(count_in::<E>(&self.conn, profile_id)?)
    }

    /// Get a profile, failing with `ProfileNotFound` when absent.
    ///
    /// # Errors
    ///
    /// Returns `ProfileNotFound` or a database error.
    pub fn get_profile(&self, id: &str) -> Result<Profile> {
        self.find::<Profile>(id)?
            .ok_or_else(|| Error::ProfileNotFound { id: id.to_string() })
    }

    /// Get all profile IDs (for Levenshtein suggestions).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_all_profile_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM profiles ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // ==================
    // Body Metric Operations
    // ==================

    /// Save a weight entry.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the write fails.
    pub fn save_weight(&mut self, entry: &WeightEntry, actor: &str) -> Result<UpsertOutcome> {
        self.save(entry, actor)
    }

    /// Save a height entry.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the write fails.
    pub fn save_height(&mut self, entry: &HeightEntry, actor: &str) -> Result<UpsertOutcome> {
        self.save(entry, actor)
    }

    /// Weight history for a profile, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn weight_history(&self, profile_id: &str) -> Result<Vec<WeightEntry>> {
        self.metric_history(profile_id)
    }

    /// Height history for a profile, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn height_history(&self, profile_id: &str) -> Result<Vec<HeightEntry>> {
        self.metric_history(profile_id)
    }

    fn metric_history<E: Entity>(&self, profile_id: &str) -> Result<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE profile_id = ?1 AND {} ORDER BY recorded_at DESC, id",
            E::COLUMNS,
            E::TABLE,
            E::SCOPE.unwrap_or("1 = 1")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([profile_id], E::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ==================
    // Status
    // ==================

    /// Count every table's records.
    ///
    /// # Errors
    ///
    /// Returns an error if any count fails.
    pub fn store_counts(&self) -> Result<StoreCounts> {
        self.read(|conn| {
            Ok(StoreCounts {
                profiles: count_in::<Profile>(conn, None)?,
                exercises: count_in::<Exercise>(conn, None)?,
                exercise_templates: count_in::<ExerciseTemplate>(conn, None)?,
                training_plans: count_in::<TrainingPlan>(conn, None)?,
                workout_sessions: count_in::<WorkoutSession>(conn, None)?,
                workout_logs: count_in::<WorkoutLog>(conn, None)?,
                max_logs: count_in::<MaxLog>(conn, None)?,
                body_metrics: count_in::<WeightEntry>(conn, None)?
                    + count_in::<HeightEntry>(conn, None)?,
            })
        })
    }
}
