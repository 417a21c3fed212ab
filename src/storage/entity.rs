//! Transaction-aware repository functions.
//!
//! Every persisted record type implements [`Entity`], which describes its
//! table and how to map it to and from rows. The generic functions in this
//! module (`find_in`, `list_in`, `upsert_in`, `delete_in`, `count_in`) take
//! any `&Connection`. A `rusqlite::Transaction` derefs to a `Connection`, so
//! callers that already hold an open transaction use the same code path as
//! one-off reads, and no nested transaction is ever opened.

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{
    Exercise, ExerciseTemplate, HeightEntry, MaxLog, Profile, TrainingPlan, ValidationResult,
    WeightEntry, WorkoutLog, WorkoutSession,
};

/// A record type stored in its own table (or a scoped slice of one).
pub trait Entity: Serialize + DeserializeOwned + Sized {
    /// Table holding the records.
    const TABLE: &'static str;
    /// Entity name used in audit events and diagnostics.
    const LABEL: &'static str;
    /// Column list matching [`Entity::from_row`].
    const COLUMNS: &'static str;
    /// Column holding the owning profile id.
    const OWNER_COLUMN: &'static str = "profile_id";
    /// Extra predicate for entities sharing a table.
    const SCOPE: Option<&'static str> = None;

    fn id(&self) -> &str;

    fn validate(&self) -> ValidationResult;

    /// Map a row selected with [`Entity::COLUMNS`].
    ///
    /// # Errors
    ///
    /// Returns an error if a column has an unexpected type.
    fn from_row(row: &Row<'_>) -> Result<Self>;

    /// Insert a new row with every field, including `created_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn insert(&self, conn: &Connection) -> Result<()>;

    /// Overwrite the mutable fields of an existing row.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    fn update(&self, conn: &Connection) -> Result<usize>;
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

fn scope_clause<E: Entity>() -> String {
    E::SCOPE.map(|s| format!(" AND {s}")).unwrap_or_default()
}

/// Find a record by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_in<E: Entity>(conn: &Connection, id: &str) -> Result<Option<E>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?1{}",
        E::COLUMNS,
        E::TABLE,
        scope_clause::<E>()
    );
    conn.query_row(&sql, [id], E::from_row).optional()
}

/// List records, optionally restricted to one owning profile.
///
/// Ordered by creation time so exports are stable.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_in<E: Entity>(conn: &Connection, profile_id: Option<&str>) -> Result<Vec<E>> {
    let scope = scope_clause::<E>();
    if let Some(profile_id) = profile_id {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1{scope} ORDER BY created_at, id",
            E::COLUMNS,
            E::TABLE,
            E::OWNER_COLUMN
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([profile_id], E::from_row)?;
        rows.collect()
    } else {
        let sql = format!(
            "SELECT {} FROM {} WHERE 1 = 1{scope} ORDER BY created_at, id",
            E::COLUMNS,
            E::TABLE
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], E::from_row)?;
        rows.collect()
    }
}

/// Update the record if its id exists, otherwise create it.
///
/// # Errors
///
/// Returns an error if the lookup or the write fails.
pub fn upsert_in<E: Entity>(conn: &Connection, entity: &E) -> Result<UpsertOutcome> {
    if find_in::<E>(conn, entity.id())?.is_some() {
        entity.update(conn)?;
        Ok(UpsertOutcome::Updated)
    } else {
        entity.insert(conn)?;
        Ok(UpsertOutcome::Created)
    }
}

/// Delete a record by id. Returns whether a row was removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_in<E: Entity>(conn: &Connection, id: &str) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1{}", E::TABLE, scope_clause::<E>());
    Ok(conn.execute(&sql, [id])? > 0)
}

/// Count records, optionally restricted to one owning profile.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_in<E: Entity>(conn: &Connection, profile_id: Option<&str>) -> Result<usize> {
    let scope = scope_clause::<E>();
    let count: i64 = if let Some(profile_id) = profile_id {
        conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?1{scope}",
                E::TABLE,
                E::OWNER_COLUMN
            ),
            [profile_id],
            |row| row.get(0),
        )?
    } else {
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE 1 = 1{scope}", E::TABLE),
            [],
            |row| row.get(0),
        )?
    };
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Read a JSON-encoded TEXT column.
fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> Result<T> {
    let raw: Option<String> = row.get(idx)?;
    let raw = raw.unwrap_or_else(|| "[]".to_string());
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Encode a value for a JSON TEXT column.
fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

// ==================
// Entity impls
// ==================

impl Entity for Profile {
    const TABLE: &'static str = "profiles";
    const LABEL: &'static str = "profile";
    const COLUMNS: &'static str =
        "id, name, email, birth_date, gender, is_active, created_at, updated_at";
    const OWNER_COLUMN: &'static str = "id";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult {
        Profile::validate(self)
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            birth_date: row.get(3)?,
            gender: row.get(4)?,
            is_active: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO profiles (id, name, email, birth_date, gender, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                self.id,
                self.name,
                self.email,
                self.birth_date,
                self.gender,
                self.is_active,
                self.created_at,
                self.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> Result<usize> {
        conn.execute(
            "UPDATE profiles SET name = ?2, email = ?3, birth_date = ?4, gender = ?5,
               is_active = ?6, updated_at = ?7
             WHERE id = ?1",
            rusqlite::params![
                self.id,
                self.name,
                self.email,
                self.birth_date,
                self.gender,
                self.is_active,
                self.updated_at,
            ],
        )
    }
}

impl Entity for Exercise {
    const TABLE: &'static str = "exercises";
    const LABEL: &'static str = "exercise";
    const COLUMNS: &'static str =
        "id, profile_id, name, category, muscle_groups, equipment, is_custom, created_at, updated_at";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult {
        Exercise::validate(self)
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            name: row.get(2)?,
            category: row.get(3)?,
            muscle_groups: json_column(row, 4)?,
            equipment: row.get(5)?,
            is_custom: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO exercises (id, profile_id, name, category, muscle_groups, equipment, is_custom, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.name,
                self.category,
                to_json(&self.muscle_groups)?,
                self.equipment,
                self.is_custom,
                self.created_at,
                self.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> Result<usize> {
        conn.execute(
            "UPDATE exercises SET profile_id = ?2, name = ?3, category = ?4, muscle_groups = ?5,
               equipment = ?6, is_custom = ?7, updated_at = ?8
             WHERE id = ?1",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.name,
                self.category,
                to_json(&self.muscle_groups)?,
                self.equipment,
                self.is_custom,
                self.updated_at,
            ],
        )
    }
}

impl Entity for ExerciseTemplate {
    const TABLE: &'static str = "exercise_templates";
    const LABEL: &'static str = "exercise_template";
    const COLUMNS: &'static str = "id, profile_id, exercise_id, name, sets, reps, weight_kg, rest_seconds, notes, created_at, updated_at";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult {
        ExerciseTemplate::validate(self)
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            exercise_id: row.get(2)?,
            name: row.get(3)?,
            sets: row.get(4)?,
            reps: row.get(5)?,
            weight_kg: row.get(6)?,
            rest_seconds: row.get(7)?,
            notes: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO exercise_templates (id, profile_id, exercise_id, name, sets, reps, weight_kg, rest_seconds, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.exercise_id,
                self.name,
                self.sets,
                self.reps,
                self.weight_kg,
                self.rest_seconds,
                self.notes,
                self.created_at,
                self.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> Result<usize> {
        conn.execute(
            "UPDATE exercise_templates SET profile_id = ?2, exercise_id = ?3, name = ?4, sets = ?5,
               reps = ?6, weight_kg = ?7, rest_seconds = ?8, notes = ?9, updated_at = ?10
             WHERE id = ?1",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.exercise_id,
                self.name,
                self.sets,
                self.reps,
                self.weight_kg,
                self.rest_seconds,
                self.notes,
                self.updated_at,
            ],
        )
    }
}

impl Entity for TrainingPlan {
    const TABLE: &'static str = "training_plans";
    const LABEL: &'static str = "training_plan";
    const COLUMNS: &'static str =
        "id, profile_id, name, description, days, is_active, created_at, updated_at";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult {
        TrainingPlan::validate(self)
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            days: json_column(row, 4)?,
            is_active: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO training_plans (id, profile_id, name, description, days, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.name,
                self.description,
                to_json(&self.days)?,
                self.is_active,
                self.created_at,
                self.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> Result<usize> {
        conn.execute(
            "UPDATE training_plans SET profile_id = ?2, name = ?3, description = ?4, days = ?5,
               is_active = ?6, updated_at = ?7
             WHERE id = ?1",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.name,
                self.description,
                to_json(&self.days)?,
                self.is_active,
                self.updated_at,
            ],
        )
    }
}

impl Entity for WorkoutSession {
    const TABLE: &'static str = "workout_sessions";
    const LABEL: &'static str = "workout_session";
    const COLUMNS: &'static str = "id, profile_id, training_plan_id, day_name, scheduled_for, completed_at, created_at, updated_at";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult {
        WorkoutSession::validate(self)
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            training_plan_id: row.get(2)?,
            day_name: row.get(3)?,
            scheduled_for: row.get(4)?,
            completed_at: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO workout_sessions (id, profile_id, training_plan_id, day_name, scheduled_for, completed_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.training_plan_id,
                self.day_name,
                self.scheduled_for,
                self.completed_at,
                self.created_at,
                self.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> Result<usize> {
        conn.execute(
            "UPDATE workout_sessions SET profile_id = ?2, training_plan_id = ?3, day_name = ?4,
               scheduled_for = ?5, completed_at = ?6, updated_at = ?7
             WHERE id = ?1",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.training_plan_id,
                self.day_name,
                self.scheduled_for,
                self.completed_at,
                self.updated_at,
            ],
        )
    }
}

impl Entity for WorkoutLog {
    const TABLE: &'static str = "workout_logs";
    const LABEL: &'static str = "workout_log";
    const COLUMNS: &'static str = "id, profile_id, training_plan_id, name, start_time, end_time, exercises, notes, created_at, updated_at";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult {
        WorkoutLog::validate(self)
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            training_plan_id: row.get(2)?,
            name: row.get(3)?,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            exercises: json_column(row, 6)?,
            notes: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO workout_logs (id, profile_id, training_plan_id, name, start_time, end_time, exercises, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.training_plan_id,
                self.name,
                self.start_time,
                self.end_time,
                to_json(&self.exercises)?,
                self.notes,
                self.created_at,
                self.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> Result<usize> {
        conn.execute(
            "UPDATE workout_logs SET profile_id = ?2, training_plan_id = ?3, name = ?4, start_time = ?5,
               end_time = ?6, exercises = ?7, notes = ?8, updated_at = ?9
             WHERE id = ?1",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.training_plan_id,
                self.name,
                self.start_time,
                self.end_time,
                to_json(&self.exercises)?,
                self.notes,
                self.updated_at,
            ],
        )
    }
}

impl Entity for MaxLog {
    const TABLE: &'static str = "max_logs";
    const LABEL: &'static str = "max_log";
    const COLUMNS: &'static str =
        "id, profile_id, exercise_id, weight_kg, reps, date, notes, created_at, updated_at";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult {
        MaxLog::validate(self)
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            exercise_id: row.get(2)?,
            weight_kg: row.get(3)?,
            reps: row.get(4)?,
            date: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO max_logs (id, profile_id, exercise_id, weight_kg, reps, date, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.exercise_id,
                self.weight_kg,
                self.reps,
                self.date,
                self.notes,
                self.created_at,
                self.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> Result<usize> {
        conn.execute(
            "UPDATE max_logs SET profile_id = ?2, exercise_id = ?3, weight_kg = ?4, reps = ?5,
               date = ?6, notes = ?7, updated_at = ?8
             WHERE id = ?1",
            rusqlite::params![
                self.id,
                self.profile_id,
                self.exercise_id,
                self.weight_kg,
                self.reps,
                self.date,
                self.notes,
                self.updated_at,
            ],
        )
    }
}

const BODY_METRIC_COLUMNS: &str = "id, profile_id, value, recorded_at, notes, created_at, updated_at";

/// Insert one body metric row of the given type.
fn insert_body_metric(
    conn: &Connection,
    metric_type: &str,
    parts: (&str, &str, f64, i64, Option<&str>, i64, i64),
) -> Result<()> {
    let (id, profile_id, value, recorded_at, notes, created_at, updated_at) = parts;
    conn.execute(
        "INSERT INTO body_metrics (id, profile_id, metric_type, value, recorded_at, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![id, profile_id, metric_type, value, recorded_at, notes, created_at, updated_at],
    )?;
    Ok(())
}

/// Update one body metric row of the given type.
fn update_body_metric(
    conn: &Connection,
    metric_type: &str,
    parts: (&str, &str, f64, i64, Option<&str>, i64),
) -> Result<usize> {
    let (id, profile_id, value, recorded_at, notes, updated_at) = parts;
    conn.execute(
        "UPDATE body_metrics SET profile_id = ?2, value = ?3, recorded_at = ?4, notes = ?5, updated_at = ?6
         WHERE id = ?1 AND metric_type = ?7",
        rusqlite::params![id, profile_id, value, recorded_at, notes, updated_at, metric_type],
    )
}

impl Entity for WeightEntry {
    const TABLE: &'static str = "body_metrics";
    const LABEL: &'static str = "weight";
    const COLUMNS: &'static str = BODY_METRIC_COLUMNS;
    const SCOPE: Option<&'static str> = Some("metric_type = 'weight'");

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult {
        WeightEntry::validate(self)
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            weight: row.get(2)?,
            recorded_at: row.get(3)?,
            notes: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn insert(&self, conn: &Connection) -> Result<()> {
        insert_body_metric(
            conn,
            "weight",
            (
                &self.id,
                &self.profile_id,
                self.weight,
                self.recorded_at,
                self.notes.as_deref(),
                self.created_at,
                self.updated_at,
            ),
        )
    }

    fn update(&self, conn: &Connection) -> Result<usize> {
        update_body_metric(
            conn,
            "weight",
            (
                &self.id,
                &self.profile_id,
                self.weight,
                self.recorded_at,
                self.notes.as_deref(),
                self.updated_at,
            ),
        )
    }
}

impl Entity for HeightEntry {
    const TABLE: &'static str = "body_metrics";
    const LABEL: &'static str = "height";
    const COLUMNS: &'static str = BODY_METRIC_COLUMNS;
    const SCOPE: Option<&'static str> = Some("metric_type = 'height'");

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult {
        HeightEntry::validate(self)
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            height: row.get(2)?,
            recorded_at: row.get(3)?,
            notes: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn insert(&self, conn: &Connection) -> Result<()> {
        insert_body_metric(
            conn,
            "height",
            (
                &self.id,
                &self.profile_id,
                self.height,
                self.recorded_at,
                self.notes.as_deref(),
                self.created_at,
                self.updated_at,
            ),
        )
    }

    fn update(&self, conn: &Connection) -> Result<usize> {
        update_body_metric(
            conn,
            "height",
            (
                &self.id,
                &self.profile_id,
                self.height,
                self.recorded_at,
                self.notes.as_deref(),
                self.updated_at,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let conn = conn();
        let mut profile = Profile::new("Sam");

        assert_eq!(upsert_in(&conn, &profile).unwrap(), UpsertOutcome::Created);

        profile.name = "Samantha".to_string();
        profile.created_at = 0;
        assert_eq!(upsert_in(&conn, &profile).unwrap(), UpsertOutcome::Updated);

        let stored: Profile = find_in(&conn, &profile.id).unwrap().unwrap();
        assert_eq!(stored.name, "Samantha");
        // created_at is not a mutable field
        assert_ne!(stored.created_at, 0);
    }

    #[test]
    fn test_list_scoped_to_profile() {
        let conn = conn();
        upsert_in(&conn, &Exercise::new("prof_a", "Squat")).unwrap();
        upsert_in(&conn, &Exercise::new("prof_a", "Bench")).unwrap();
        upsert_in(&conn, &Exercise::new("prof_b", "Row")).unwrap();

        assert_eq!(list_in::<Exercise>(&conn, Some("prof_a")).unwrap().len(), 2);
        assert_eq!(list_in::<Exercise>(&conn, None).unwrap().len(), 3);
        assert_eq!(count_in::<Exercise>(&conn, Some("prof_b")).unwrap(), 1);
    }

    #[test]
    fn test_body_metrics_are_scoped_by_type() {
        let conn = conn();
        let weight = WeightEntry::new("prof_a", 81.5);
        let height = HeightEntry::new("prof_a", 180.0);
        upsert_in(&conn, &weight).unwrap();
        upsert_in(&conn, &height).unwrap();

        assert_eq!(list_in::<WeightEntry>(&conn, Some("prof_a")).unwrap(), vec![weight.clone()]);
        assert_eq!(list_in::<HeightEntry>(&conn, Some("prof_a")).unwrap(), vec![height]);

        // A weight id never resolves as a height
        assert!(find_in::<HeightEntry>(&conn, &weight.id).unwrap().is_none());
        assert!(!delete_in::<HeightEntry>(&conn, &weight.id).unwrap());
        assert!(delete_in::<WeightEntry>(&conn, &weight.id).unwrap());
    }

    #[test]
    fn test_json_columns_round_trip() {
        let conn = conn();
        let mut plan = TrainingPlan::new("prof_a", "PPL");
        plan.days.push(crate::model::PlanDay {
            name: "Push".to_string(),
            template_ids: vec!["tmpl_1".to_string()],
        });
        upsert_in(&conn, &plan).unwrap();

        let stored: TrainingPlan = find_in(&conn, &plan.id).unwrap().unwrap();
        assert_eq!(stored, plan);
    }

    #[test]
    fn test_upsert_inside_transaction() {
        let mut conn = conn();
        let log = WorkoutLog::new("prof_a", "Legs");

        let tx = conn.transaction().unwrap();
        upsert_in(&tx, &log).unwrap();
        tx.rollback().unwrap();

        assert!(find_in::<WorkoutLog>(&conn, &log.id).unwrap().is_none());
    }
}
