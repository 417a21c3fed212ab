//! Body metric models.
//!
//! Weight and height history share one table but have distinct plain
//! shapes: a weight record carries `weight`, a height record carries
//! `height`. Imports route on which of the two fields is present.

use serde::{Deserialize, Serialize};

use super::{new_id, now_millis, ValidationResult};

/// A body weight measurement in kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub id: String,
    pub profile_id: String,
    pub weight: f64,
    pub recorded_at: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WeightEntry {
    /// Record a weight measured now.
    pub fn new(profile_id: &str, weight: f64) -> Self {
        let now = now_millis();
        Self {
            id: new_id("bw"),
            profile_id: profile_id.to_string(),
            weight,
            recorded_at: now,
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
        result.check(self.weight > 0.0, "weight must be positive");
        result
    }
}

/// A body height measurement in centimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightEntry {
    pub id: String,
    pub profile_id: String,
    pub height: f64,
    pub recorded_at: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl HeightEntry {
    /// Record a height measured now.
    pub fn new(profile_id: &str, height: f64) -> Self {
        let now = now_millis();
        Self {
            id: new_id("bh"),
            profile_id: profile_id.to_string(),
            height,
            recorded_at: now,
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
        result.check(self.height > 0.0, "height must be positive");
        result
    }
}
