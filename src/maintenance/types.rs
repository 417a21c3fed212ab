//! Result types for maintenance operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::sync::EntityKind;
use crate::validate::normalize_bulk_delete_option;

/// Bulk-delete strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkDeleteOption {
    /// Delete every profile and everything they own.
    All,
    /// Delete workout logs and max logs older than the retention window.
    OldData,
    /// Delete inactive profiles and their history.
    InactiveProfiles,
}

impl BulkDeleteOption {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::OldData => "OLD_DATA",
            Self::InactiveProfiles => "INACTIVE_PROFILES",
        }
    }
}

impl fmt::Display for BulkDeleteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkDeleteOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_bulk_delete_option(s) {
            Ok(canonical) => match canonical.as_str() {
                "ALL" => Ok(Self::All),
                "OLD_DATA" => Ok(Self::OldData),
                "INACTIVE_PROFILES" => Ok(Self::InactiveProfiles),
                _ => Err(invalid_option(s, None)),
            },
            Err((input, suggestion)) => Err(invalid_option(&input, suggestion)),
        }
    }
}

fn invalid_option(input: &str, suggestion: Option<String>) -> Error {
    let message = match suggestion {
        Some(s) => format!("Invalid bulk delete option: {input} (did you mean {s}?)"),
        None => format!("Invalid bulk delete option: {input}"),
    };
    Error::InvalidArgument(message)
}

/// Per-kind deletion counts from a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub profiles: usize,
    pub exercises: usize,
    pub exercise_templates: usize,
    pub training_plans: usize,
    pub workout_logs: usize,
    pub max_logs: usize,
    pub body_metrics: usize,
    /// Sum of the per-kind counts, set once all work is done.
    pub total_deleted: usize,
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Add to one kind's count.
    pub fn add(&mut self, kind: EntityKind, count: usize) {
        let slot = match kind {
            EntityKind::Profiles => &mut self.profiles,
            EntityKind::Exercises => &mut self.exercises,
            EntityKind::ExerciseTemplates => &mut self.exercise_templates,
            EntityKind::TrainingPlans => &mut self.training_plans,
            EntityKind::WorkoutLogs => &mut self.workout_logs,
            EntityKind::MaxLogs => &mut self.max_logs,
            EntityKind::BodyMetrics => &mut self.body_metrics,
        };
        *slot += count;
    }

    pub(crate) fn finish(&mut self) {
        self.total_deleted = self.profiles
            + self.exercises
            + self.exercise_templates
            + self.training_plans
            + self.workout_logs
            + self.max_logs
            + self.body_metrics;
    }
}

/// Outcome of `optimize_database`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResult {
    pub message: String,
    pub operations_performed: Vec<String>,
    pub orphaned_sessions_removed: usize,
}

/// Outcome of `validate_data_integrity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub total_records_checked: usize,
}
