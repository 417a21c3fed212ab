//! Workout log model.

use serde::{Deserialize, Serialize};

use super::{new_id, now_millis, ValidationResult};

/// One performed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedSet {
    pub reps: u32,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

/// An exercise performed during a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedExercise {
    pub exercise_id: String,
    #[serde(default)]
    pub sets: Vec<LoggedSet>,
}

/// A completed (or in-progress) workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    pub id: String,
    pub profile_id: String,
    #[serde(default)]
    pub training_plan_id: Option<String>,
    pub name: String,
    /// Start time (Unix milliseconds); age-based retention keys off this
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub exercises: Vec<LoggedExercise>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WorkoutLog {
    /// Start a new workout now.
    pub fn new(profile_id: &str, name: &str) -> Self {
        let now = now_millis();
        Self {
            id: new_id("wlog"),
            profile_id: profile_id.to_string(),
            training_plan_id: None,
            name: name.to_string(),
            start_time: Some(now),
            end_time: None,
            exercises: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the start time.
    #[must_use]
    pub fn started_at(mut self, start_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Check schema rules.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        result.require(&self.id, "id");
        result.require(&self.profile_id, "profileId");
        result.require(&self.name, "name");
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            result.check(end >= start, "endTime must not precede startTime");
        }
        for exercise in &self.exercises {
            result.check(
                !exercise.exercise_id.trim().is_empty(),
                "exercises[].exerciseId is required",
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_before_start_is_invalid() {
        let mut log = WorkoutLog::new("prof_1", "Push day").started_at(Some(2_000));
        log.end_time = Some(1_000);
        assert!(!log.validate().is_valid());
    }

    #[test]
    fn test_nested_sets_round_trip_through_plain_record() {
        let mut log = WorkoutLog::new("prof_1", "Pull day");
        log.exercises.push(LoggedExercise {
            exercise_id: "ex_1".to_string(),
            sets: vec![LoggedSet { reps: 8, weight_kg: Some(60.0) }],
        });
        let plain = serde_json::to_value(&log).unwrap();
        assert_eq!(plain["exercises"][0]["sets"][0]["weightKg"], 60.0);

        let back: WorkoutLog = serde_json::from_value(plain).unwrap();
        assert_eq!(back, log);
    }
}
