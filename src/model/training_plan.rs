//! Training plan model and the scheduled sessions that belong to it.
//!
//! Sessions reference their plan by id only. When a plan disappears the
//! sessions pointing at it become orphans, which `maintenance::optimize`
//! removes.

use serde::{Deserialize, Serialize};

use super::{new_id, now_millis, ValidationResult};

/// One day of a training plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    pub name: String,
    #[serde(default)]
    pub template_ids: Vec<String>,
}

/// A multi-day training plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub days: Vec<PlanDay>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TrainingPlan {
    /// Create a new, inactive plan with no days.
    pub fn new(profile_id: &str, name: &str) -> Self {
        let now = now_millis();
        Self {
            id: new_id("plan"),
            profile_id: profile_id.to_string(),
            name: name.to_string(),
            description: None,
            days: Vec::new(),
            is_active: false,
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
        for (i, day) in self.days.iter().enumerate() {
            result.check(!day.name.trim().is_empty(), format!("days[{i}].name is required"));
        }
        result
    }
}

/// A scheduled instance of a plan day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub profile_id: String,
    /// Plan this session was generated from
    #[serde(default)]
    pub training_plan_id: Option<String>,
    #[serde(default)]
    pub day_name: Option<String>,
    #[serde(default)]
    pub scheduled_for: Option<i64>,
    #[serde(default)]
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WorkoutSession {
    /// Schedule a session for a plan.
    pub fn new(profile_id: &str, training_plan_id: Option<&str>) -> Self {
        let now = now_millis();
        Self {
            id: new_id("wsess"),
            profile_id: profile_id.to_string(),
            training_plan_id: training_plan_id.map(ToString::to_string),
            day_name: None,
            scheduled_for: None,
            completed_at: None,
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
        result
    }
}
