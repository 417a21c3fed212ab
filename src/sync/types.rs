//! Sync types for snapshot export/import.
//!
//! A [`Snapshot`] carries one profile's full dataset as plain JSON records,
//! one sequence per [`EntityKind`]. Records are kept as `serde_json::Value`
//! so that a single malformed record fails on its own during import instead
//! of failing the whole file.

use serde::{Deserialize, Serialize};

/// Snapshot format version written by this build.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Records per chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Import failure ratio at or above which the import is a conflict.
pub const CONFLICT_THRESHOLD: f64 = 0.5;

/// A versioned, self-contained export of one profile's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    /// RFC 3339 capture time.
    pub exported_at: String,
    #[serde(default)]
    pub profiles: Vec<serde_json::Value>,
    #[serde(default)]
    pub exercises: Vec<serde_json::Value>,
    #[serde(default)]
    pub exercise_templates: Vec<serde_json::Value>,
    #[serde(default)]
    pub training_plans: Vec<serde_json::Value>,
    #[serde(default)]
    pub workout_logs: Vec<serde_json::Value>,
    #[serde(default)]
    pub max_logs: Vec<serde_json::Value>,
    /// Weight and height records together.
    #[serde(default)]
    pub body_metrics: Vec<serde_json::Value>,
}

impl Snapshot {
    /// An empty snapshot stamped with the current version and time.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            profiles: Vec::new(),
            exercises: Vec::new(),
            exercise_templates: Vec::new(),
            training_plans: Vec::new(),
            workout_logs: Vec::new(),
            max_logs: Vec::new(),
            body_metrics: Vec::new(),
        }
    }

    /// Records of one kind.
    #[must_use]
    pub fn records(&self, kind: EntityKind) -> &[serde_json::Value] {
        match kind {
            EntityKind::Profiles => &self.profiles,
            EntityKind::Exercises => &self.exercises,
            EntityKind::ExerciseTemplates => &self.exercise_templates,
            EntityKind::TrainingPlans => &self.training_plans,
            EntityKind::WorkoutLogs => &self.workout_logs,
            EntityKind::MaxLogs => &self.max_logs,
            EntityKind::BodyMetrics => &self.body_metrics,
        }
    }

    /// Mutable records of one kind.
    pub fn records_mut(&mut self, kind: EntityKind) -> &mut Vec<serde_json::Value> {
        match kind {
            EntityKind::Profiles => &mut self.profiles,
            EntityKind::Exercises => &mut self.exercises,
            EntityKind::ExerciseTemplates => &mut self.exercise_templates,
            EntityKind::TrainingPlans => &mut self.training_plans,
            EntityKind::WorkoutLogs => &mut self.workout_logs,
            EntityKind::MaxLogs => &mut self.max_logs,
            EntityKind::BodyMetrics => &mut self.body_metrics,
        }
    }

    /// Total records across every kind.
    #[must_use]
    pub fn total_records(&self) -> usize {
        EntityKind::ALL
            .iter()
            .map(|kind| self.records(*kind).len())
            .sum()
    }
}

/// The entity kinds carried by a snapshot, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Profiles,
    Exercises,
    ExerciseTemplates,
    TrainingPlans,
    WorkoutLogs,
    MaxLogs,
    BodyMetrics,
}

impl EntityKind {
    /// Every kind, in export and import order.
    pub const ALL: [Self; 7] = [
        Self::Profiles,
        Self::Exercises,
        Self::ExerciseTemplates,
        Self::TrainingPlans,
        Self::WorkoutLogs,
        Self::MaxLogs,
        Self::BodyMetrics,
    ];

    /// Snapshot key for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Exercises => "exercises",
            Self::ExerciseTemplates => "exerciseTemplates",
            Self::TrainingPlans => "trainingPlans",
            Self::WorkoutLogs => "workoutLogs",
            Self::MaxLogs => "maxLogs",
            Self::BodyMetrics => "bodyMetrics",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind tag on a conflict entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    ImportFailure,
}

/// One accumulated import error, by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictEntry {
    pub message: String,
    pub kind: ConflictKind,
    pub index: usize,
}

/// Structured payload of an import whose failure ratio crossed the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDescriptor {
    /// The failure message that triggered the conflict.
    pub message: String,
    pub conflicts: Vec<ConflictEntry>,
}

impl ConflictDescriptor {
    /// Build a descriptor with one entry per error, in order.
    #[must_use]
    pub fn from_errors(message: &str, errors: &[String]) -> Self {
        Self {
            message: message.to_string(),
            conflicts: errors
                .iter()
                .enumerate()
                .map(|(index, error)| ConflictEntry {
                    message: error.clone(),
                    kind: ConflictKind::ImportFailure,
                    index,
                })
                .collect(),
        }
    }
}
