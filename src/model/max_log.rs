//! Max log model (personal records).

use serde::{Deserialize, Serialize};

use super::{new_id, now_millis, ValidationResult};

/// A recorded maximal lift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxLog {
    pub id: String,
    pub profile_id: String,
    pub exercise_id: String,
    pub weight_kg: f64,
    #[serde(default = "default_reps")]
    pub reps: u32,
    /// Date of the lift (Unix milliseconds)
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

const fn default_reps() -> u32 {
    1
}

impl MaxLog {
    /// Record a one-rep max lifted now.
    pub fn new(profile_id: &str, exercise_id: &str, weight_kg: f64) -> Self {
        let now = now_millis();
        Self {
            id: new_id("max"),
            profile_id: profile_id.to_string(),
            exercise_id: exercise_id.to_string(),
            weight_kg,
            reps: 1,
            date: Some(now),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the lift date.
    #[must_use]
    pub fn dated(mut self, date: Option<i64>) -> Self {
        self.date = date;
        self
    }

    /// Check schema rules.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        result.require(&self.id, "id");
        result.require(&self.profile_id, "profileId");
        result.require(&self.exercise_id, "exerciseId");
        result.check(self.weight_kg > 0.0, "weightKg must be positive");
        result.check(self.reps > 0, "reps must be at least 1");
        result
    }
}
