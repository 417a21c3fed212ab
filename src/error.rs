//! Error types for the Liftlog CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, 5=conflict, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::sync::ConflictDescriptor;

/// Result type alias for Liftlog operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string; shells on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    ProfileNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Conflict (exit 5)
    ImportConflict,

    // Sync (exit 6)
    SyncError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ImportConflict => "IMPORT_CONFLICT",
            Self::SyncError => "SYNC_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::ProfileNotFound => 3,
            Self::InvalidArgument => 4,
            Self::ImportConflict => 5,
            Self::SyncError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether a caller should retry with corrected input.
    ///
    /// True for validation errors and transient database errors (locks).
    /// An import conflict needs a decision, not a retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidArgument | Self::DatabaseError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Liftlog operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `liftlog init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Profile not found: {id}")]
    ProfileNotFound { id: String },

    #[error("Profile not found: {id} (did you mean: {}?)", similar.join(", "))]
    ProfileNotFoundSimilar { id: String, similar: Vec<String> },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Import failed for at least half of its records.
    #[error("Import conflict: {}", .0.message)]
    ImportConflict(ConflictDescriptor),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::ProfileNotFound { .. } | Self::ProfileNotFoundSimilar { .. } => {
                ErrorCode::ProfileNotFound
            }
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::ImportConflict(_) => ErrorCode::ImportConflict,
            Self::Sync(_) => ErrorCode::SyncError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// The conflict descriptor, if this is an import conflict.
    #[must_use]
    pub fn conflict(&self) -> Option<&ConflictDescriptor> {
        match self {
            Self::ImportConflict(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `liftlog init` to create the database".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::ProfileNotFound { id } => Some(format!(
                "No profile with ID '{id}'. Use `liftlog profile list` to see available profiles."
            )),
            Self::ProfileNotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }

            Self::InvalidArgument(msg) => {
                if msg.contains("bulk delete option") {
                    Some(
                        "Valid options: ALL, OLD_DATA, INACTIVE_PROFILES. \
                         Synonyms: everything→ALL, old→OLD_DATA, inactive→INACTIVE_PROFILES"
                            .to_string(),
                    )
                } else if msg.contains("chunk size") {
                    Some("Chunk size must be a positive integer (default 100)".to_string())
                } else {
                    None
                }
            }

            Self::ImportConflict(descriptor) => Some(format!(
                "{} of the import's records could not be applied. \
                 Check the snapshot's origin and version before retrying.",
                descriptor.conflicts.len()
            )),

            Self::Sync(msg) if msg.contains("not found") => {
                Some("Run `liftlog export --profile <id> --output <file>` first".to_string())
            }

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Sync(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, optional
    /// recovery hint, and the conflict list for import conflicts.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        if let Some(descriptor) = self.conflict() {
            obj["error"]["conflicts"] =
                serde_json::to_value(&descriptor.conflicts).unwrap_or_default();
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::NotInitialized.exit_code(), 2);
        assert_eq!(Error::ProfileNotFound { id: "p1".into() }.exit_code(), 3);
        let similar = Error::ProfileNotFoundSimilar {
            id: "prof_1".into(),
            similar: vec!["prof_2".into()],
        };
        assert_eq!(similar.exit_code(), 3);
        assert!(similar.to_string().contains("did you mean: prof_2?"));
        assert_eq!(Error::InvalidArgument("x".into()).exit_code(), 4);
        assert_eq!(Error::Other("boom".into()).exit_code(), 1);
    }

    #[test]
    fn test_conflict_structured_json() {
        let descriptor = ConflictDescriptor::from_errors(
            "Import failed",
            &["bad record".to_string(), "worse record".to_string()],
        );
        let err = Error::ImportConflict(descriptor);

        assert_eq!(err.exit_code(), 5);
        assert!(!err.error_code().is_retryable());

        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "IMPORT_CONFLICT");
        assert_eq!(json["error"]["conflicts"][1]["index"], 1);
        assert_eq!(json["error"]["conflicts"][0]["kind"], "import_failure");
    }

    #[test]
    fn test_bulk_delete_hint() {
        let err = Error::InvalidArgument("Invalid bulk delete option: NOPE".into());
        assert!(err.hint().unwrap().contains("OLD_DATA"));
    }
}
