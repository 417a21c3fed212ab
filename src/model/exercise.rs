//! Exercise and exercise template models.

use serde::{Deserialize, Serialize};

use super::{new_id, now_millis, ValidationResult};

/// An exercise in a profile's library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Exercise {
    /// Create a new custom exercise for a profile.
    pub fn new(profile_id: &str, name: &str) -> Self {
        let now = now_millis();
        Self {
            id: new_id("ex"),
            profile_id: profile_id.to_string(),
            name: name.to_string(),
            category: None,
            muscle_groups: Vec::new(),
            equipment: None,
            is_custom: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check schema rules.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        result.require(&self.id, "id");
        result.require(&self.profile_id, "profileId");
        result.require(&self.name, "name");
        result
    }
}

/// A reusable prescription of sets/reps/load for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseTemplate {
    pub id: String,
    pub profile_id: String,
    pub exercise_id: String,
    pub name: String,
    pub sets: u32,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ExerciseTemplate {
    /// Create a new template for an exercise.
    pub fn new(profile_id: &str, exercise_id: &str, name: &str, sets: u32) -> Self {
        let now = now_millis();
        Self {
            id: new_id("tmpl"),
            profile_id: profile_id.to_string(),
            exercise_id: exercise_id.to_string(),
            name: name.to_string(),
            sets,
            reps: None,
            weight_kg: None,
            rest_seconds: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check schema rules.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        result.require(&self.id, "id");
        result.require(&self.profile_id, "profileId");
        result.require(&self.exercise_id, "exerciseId");
        result.require(&self.name, "name");
        result.check(self.sets > 0, "sets must be at least 1");
        if let Some(weight) = self.weight_kg {
            result.check(weight >= 0.0, "weightKg must not be negative");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_hydrates_with_defaults() {
        let plain = serde_json::json!({
            "id": "ex_1",
            "profileId": "prof_1",
            "name": "Squat",
            "createdAt": 1,
            "updatedAt": 2
        });
        let exercise: Exercise = serde_json::from_value(plain).unwrap();
        assert!(exercise.muscle_groups.is_empty());
        assert!(!exercise.is_custom);
        assert!(exercise.validate().is_valid());
    }

    #[test]
    fn test_template_requires_sets() {
        let template = ExerciseTemplate::new("prof_1", "ex_1", "5x5", 0);
        assert!(!template.validate().is_valid());
    }
}
