//! Data models for Liftlog.
//!
//! This module contains all domain models:
//! - Profile
//! - Exercise and ExerciseTemplate
//! - TrainingPlan and WorkoutSession
//! - WorkoutLog
//! - MaxLog
//! - WeightEntry and HeightEntry (body metrics)
//!
//! Every model serializes to a camelCase "plain record", which is the
//! shape stored in export snapshots.

pub mod body_metrics;
pub mod exercise;
pub mod max_log;
pub mod profile;
pub mod training_plan;
pub mod workout_log;

pub use body_metrics::{HeightEntry, WeightEntry};
pub use exercise::{Exercise, ExerciseTemplate};
pub use max_log::MaxLog;
pub use profile::Profile;
pub use training_plan::{PlanDay, TrainingPlan, WorkoutSession};
pub use workout_log::{LoggedExercise, LoggedSet, WorkoutLog};

/// Outcome of validating a model against its schema rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Human-readable rule violations, empty when valid.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Returns true if no rule was violated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a violation unless `ok` holds.
    pub fn check(&mut self, ok: bool, message: impl Into<String>) {
        if !ok {
            self.errors.push(message.into());
        }
    }

    /// Record a violation if the field is blank.
    pub fn require(&mut self, value: &str, field: &str) {
        self.check(!value.trim().is_empty(), format!("{field} is required"));
    }

    /// Join all violations into one message.
    #[must_use]
    pub fn message(&self) -> String {
        self.errors.join("; ")
    }
}

/// Generate a prefixed identifier, e.g. `prof_1a2b3c4d5e6f`.
#[must_use]
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

/// Current time in Unix milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
