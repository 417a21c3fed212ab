//! Audit event storage and retrieval.
//!
//! Events track record mutations and bulk operations for debugging and
//! history. They are written inside the same transaction as the change.

use rusqlite::{Connection, Result};

/// Event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    // Record events
    RecordCreated,
    RecordUpdated,
    RecordDeleted,

    // Sync events
    SnapshotExported,
    SnapshotImported,

    // Maintenance events
    BulkDeleteCompleted,
    DatabaseOptimized,
    OrphansRemoved,
}

impl EventType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RecordCreated => "record_created",
            Self::RecordUpdated => "record_updated",
            Self::RecordDeleted => "record_deleted",
            Self::SnapshotExported => "snapshot_exported",
            Self::SnapshotImported => "snapshot_imported",
            Self::BulkDeleteCompleted => "bulk_delete_completed",
            Self::DatabaseOptimized => "database_optimized",
            Self::OrphansRemoved => "orphans_removed",
        }
    }

    /// Parse from the stored string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "record_created" => Self::RecordCreated,
            "record_updated" => Self::RecordUpdated,
            "record_deleted" => Self::RecordDeleted,
            "snapshot_exported" => Self::SnapshotExported,
            "snapshot_imported" => Self::SnapshotImported,
            "bulk_delete_completed" => Self::BulkDeleteCompleted,
            "database_optimized" => Self::DatabaseOptimized,
            "orphans_removed" => Self::OrphansRemoved,
            _ => return None,
        })
    }
}

/// An audit event record.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: String,
    pub event_type: EventType,
    pub actor: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub comment: Option<String>,
    pub created_at: i64,
}

impl Event {
    /// Create a new event (id will be assigned by database).
    #[must_use]
    pub fn new(entity_type: &str, entity_id: &str, event_type: EventType, actor: &str) -> Self {
        Self {
            id: 0,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            event_type,
            actor: actor.to_string(),
            old_value: None,
            new_value: None,
            comment: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Add a comment to the event.
    #[must_use]
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// Insert an event into the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            event.entity_type,
            event.entity_id,
            event.event_type.as_str(),
            event.actor,
            event.old_value,
            event.new_value,
            event.comment,
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get the most recent events of one type, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_events_by_type(
    conn: &Connection,
    event_type: EventType,
    limit: Option<u32>,
) -> Result<Vec<Event>> {
    let limit = limit.unwrap_or(100);
    let mut stmt = conn.prepare(
        "SELECT id, entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at
         FROM events
         WHERE event_type = ?1
         ORDER BY id DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(rusqlite::params![event_type.as_str(), limit], |row| {
        let stored: String = row.get(3)?;
        Ok(Event {
            id: row.get(0)?,
            entity_type: row.get(1)?,
            entity_id: row.get(2)?,
            event_type: EventType::parse(&stored).unwrap_or(event_type),
            actor: row.get(4)?,
            old_value: row.get(5)?,
            new_value: row.get(6)?,
            comment: row.get(7)?,
            created_at: row.get(8)?,
        })
    })?;

    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    #[test]
    fn test_event_insert_and_get() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let event = Event::new("profile", "prof_123", EventType::SnapshotExported, "test-actor")
            .with_comment("42 records");

        let id = insert_event(&conn, &event).unwrap();
        assert!(id > 0);

        let events = get_events_by_type(&conn, EventType::SnapshotExported, Some(10)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor, "test-actor");
        assert!(events[0].old_value.is_none() && events[0].new_value.is_none());
        assert_eq!(events[0].comment.as_deref(), Some("42 records"));
    }

    #[test]
    fn test_event_type_round_trip() {
        for ty in [
            EventType::RecordCreated,
            EventType::BulkDeleteCompleted,
            EventType::OrphansRemoved,
        ] {
            assert_eq!(EventType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EventType::parse("nope"), None);
    }
}
