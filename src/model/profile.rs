//! Profile model for Liftlog.
//!
//! A profile is the owner of every other record. Inactive profiles are
//! candidates for the inactive-profile purge.

use serde::{Deserialize, Serialize};

use super::{new_id, now_millis, ValidationResult};

/// A person whose training is being logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    /// ISO date (YYYY-MM-DD)
    #[serde(default)]
    pub birth_date: Option<String>,

    #[serde(default)]
    pub gender: Option<String>,

    /// Whether the profile is still in use
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

const fn default_active() -> bool {
    true
}

impl Profile {
    /// Create a new active profile.
    pub fn new(name: &str) -> Self {
        let now = now_millis();
        Self {
            id: new_id("prof"),
            name: name.to_string(),
            email: None,
            birth_date: None,
            gender: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the email address.
    #[must_use]
    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    /// Set the active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Check schema rules.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        result.require(&self.id, "id");
        result.require(&self.name, "name");
        if let Some(email) = &self.email {
            result.check(email.contains('@'), format!("email '{email}' is not valid"));
        }
        if let Some(date) = &self.birth_date {
            result.check(
                chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok(),
                format!("birthDate '{date}' is not a YYYY-MM-DD date"),
            );
        }
        result
    }
}
