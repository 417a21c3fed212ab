//! Database schema definitions.
//!
//! This module contains the complete SQLite schema for Liftlog.
//!
//! Note: Timestamps are stored as INTEGER (Unix milliseconds). References
//! between collections (`profile_id`, `training_plan_id`, ...) are plain
//! columns without FOREIGN KEY constraints; dangling references are found
//! and repaired by the maintenance engine instead of being rejected on write.

use rusqlite::{Connection, Result};

/// Current schema version for migration tracking.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the Liftlog database.
pub const SCHEMA_SQL: &str = r"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- ====================
-- Core Tables
-- ====================

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    birth_date TEXT,
    gender TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_profiles_active ON profiles(is_active);

CREATE TABLE IF NOT EXISTS exercises (
    id TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL,
    name TEXT NOT NULL,
    category TEXT,
    muscle_groups TEXT DEFAULT '[]',
    equipment TEXT,
    is_custom INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_exercises_profile ON exercises(profile_id);

CREATE TABLE IF NOT EXISTS exercise_templates (
    id TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL,
    exercise_id TEXT NOT NULL,
    name TEXT NOT NULL,
    sets INTEGER NOT NULL DEFAULT 1,
    reps INTEGER,
    weight_kg REAL,
    rest_seconds INTEGER,
    notes TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_exercise_templates_profile ON exercise_templates(profile_id);
CREATE INDEX IF NOT EXISTS idx_exercise_templates_exercise ON exercise_templates(exercise_id);

CREATE TABLE IF NOT EXISTS training_plans (
    id TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    days TEXT DEFAULT '[]',
    is_active INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_training_plans_profile ON training_plans(profile_id);

CREATE TABLE IF NOT EXISTS workout_logs (
    id TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL,
    training_plan_id TEXT,
    name TEXT NOT NULL,
    start_time INTEGER,
    end_time INTEGER,
    exercises TEXT DEFAULT '[]',
    notes TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_workout_logs_profile ON workout_logs(profile_id);
CREATE INDEX IF NOT EXISTS idx_workout_logs_start ON workout_logs(start_time);

CREATE TABLE IF NOT EXISTS max_logs (
    id TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL,
    exercise_id TEXT NOT NULL,
    weight_kg REAL NOT NULL,
    reps INTEGER NOT NULL DEFAULT 1,
    date INTEGER,
    notes TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_max_logs_profile ON max_logs(profile_id);
CREATE INDEX IF NOT EXISTS idx_max_logs_date ON max_logs(date);

-- Weight and height history share one table, discriminated by metric_type
CREATE TABLE IF NOT EXISTS body_metrics (
    id TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL,
    metric_type TEXT NOT NULL,
    value REAL NOT NULL,
    recorded_at INTEGER NOT NULL,
    notes TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    CHECK (metric_type IN ('weight', 'height'))
);

CREATE INDEX IF NOT EXISTS idx_body_metrics_profile_type ON body_metrics(profile_id, metric_type, recorded_at);

-- ====================
-- Audit Events
-- ====================

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    event_type TEXT NOT NULL,
    actor TEXT NOT NULL,
    old_value TEXT,
    new_value TEXT,
    comment TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id);
";

/// Apply the schema to a connection.
///
/// Sets pragmas, creates all tables, runs pending migrations and records
/// the schema version. Idempotent.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    // Set pragmas before schema creation
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "cache_size", "-64000")?; // 64MB cache
    conn.pragma_update(None, "temp_store", "MEMORY")?;

    conn.execute_batch(SCHEMA_SQL)?;

    // Run migrations for existing databases
    super::migrations::run_migrations(conn)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_applies_cleanly() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let tables: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('profiles', 'exercises', 'exercise_templates', 'training_plans',
                              'workout_sessions', 'workout_logs', 'max_logs', 'body_metrics', 'events')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 9);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        apply_schema(&conn).unwrap();
    }

    #[test]
    fn test_metric_type_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let ok = conn.execute(
            "INSERT INTO body_metrics (id, profile_id, metric_type, value, recorded_at, created_at, updated_at)
             VALUES ('bm1', 'p1', 'weight', 80.0, 0, 0, 0)",
            [],
        );
        assert!(ok.is_ok());

        let bad = conn.execute(
            "INSERT INTO body_metrics (id, profile_id, metric_type, value, recorded_at, created_at, updated_at)
             VALUES ('bm2', 'p1', 'bodyfat', 12.0, 0, 0, 0)",
            [],
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_orphans_are_representable() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO workout_logs (id, profile_id, name, created_at, updated_at)
             VALUES ('wl1', 'missing_profile', 'Legs', 0, 0)",
            [],
        );
        assert!(result.is_ok());
    }
}
