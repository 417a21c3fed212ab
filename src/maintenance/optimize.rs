//! Database optimization and orphaned session cleanup.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::Result;
use crate::maintenance::types::OptimizeResult;
use crate::model::{TrainingPlan, WorkoutSession};
use crate::storage::entity::{delete_in, list_in, Entity};
use crate::storage::events::EventType;
use crate::storage::sqlite::SqliteStorage;

/// Run every optimization step in order.
///
/// Steps are: `ANALYZE`, `REINDEX`, removal of workout sessions whose
/// training plan is missing, and `PRAGMA optimize`. Each completed step's
/// name is appended to `operations_performed`.
///
/// # Errors
///
/// Any failing step aborts the whole operation.
pub fn optimize_database(storage: &mut SqliteStorage, actor: &str) -> Result<OptimizeResult> {
    let mut operations = Vec::new();

    storage.conn().execute_batch("ANALYZE")?;
    operations.push("analyze".to_string());
    debug!("Statistics analyzed");

    storage.conn().execute_batch("REINDEX")?;
    operations.push("reindex".to_string());
    debug!("Indexes rebuilt");

    let removed = remove_orphaned_sessions(storage, actor)?;
    operations.push("cleanup_orphaned_sessions".to_string());

    storage.conn().execute_batch("PRAGMA optimize")?;
    operations.push("optimize".to_string());

    let summary = operations.join(", ");
    storage.mutate("optimize_database", actor, |_, ctx| {
        ctx.record_comment("database", "main", EventType::DatabaseOptimized, &summary);
        Ok(())
    })?;

    info!(removed, operations = %summary, "Database optimized");

    Ok(OptimizeResult {
        message: format!("Database optimized, {removed} orphaned sessions removed"),
        operations_performed: operations,
        orphaned_sessions_removed: removed,
    })
}

/// Delete workout sessions with a missing, empty or unknown training plan.
///
/// # Errors
///
/// Returns an error if the transaction fails; nothing is deleted then.
pub fn remove_orphaned_sessions(storage: &mut SqliteStorage, actor: &str) -> Result<usize> {
    storage.mutate("remove_orphaned_sessions", actor, |tx, ctx| {
        let valid_plans: HashSet<String> = list_in::<TrainingPlan>(tx, None)?
            .into_iter()
            .map(|plan| plan.id)
            .collect();

        let orphaned: Vec<WorkoutSession> = list_in::<WorkoutSession>(tx, None)?
            .into_iter()
            .filter(|session| match session.training_plan_id.as_deref() {
                None | Some("") => true,
                Some(plan_id) => !valid_plans.contains(plan_id),
            })
            .collect();

        let mut removed = 0;
        for session in &orphaned {
            if delete_in::<WorkoutSession>(tx, &session.id)? {
                removed += 1;
            }
        }

        if removed > 0 {
            ctx.record_comment(
                WorkoutSession::LABEL,
                "*",
                EventType::OrphansRemoved,
                &format!("{removed} orphaned sessions removed"),
            );
        }
        Ok(removed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::events::get_events_by_type;

    #[test]
    fn test_optimize_removes_orphaned_sessions() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let plan = TrainingPlan::new("prof_1", "Linear");
        storage.save(&plan, "test").unwrap();

        let linked = WorkoutSession::new("prof_1", Some(&plan.id));
        let dangling = WorkoutSession::new("prof_1", Some("plan_gone"));
        let unplanned = WorkoutSession::new("prof_1", None);
        let mut blank = WorkoutSession::new("prof_1", None);
        blank.training_plan_id = Some(String::new());
        for session in [&linked, &dangling, &unplanned, &blank] {
            storage.save(session, "test").unwrap();
        }

        let result = optimize_database(&mut storage, "test").unwrap();

        assert_eq!(result.orphaned_sessions_removed, 3);
        assert_eq!(
            result.operations_performed,
            vec!["analyze", "reindex", "cleanup_orphaned_sessions", "optimize"]
        );
        let remaining: Vec<WorkoutSession> = storage.find_all(None).unwrap();
        assert_eq!(remaining, vec![linked]);

        let events = get_events_by_type(storage.conn(), EventType::OrphansRemoved, None).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_optimize_on_clean_database() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let result = optimize_database(&mut storage, "test").unwrap();

        assert_eq!(result.orphaned_sessions_removed, 0);
        assert_eq!(result.operations_performed.len(), 4);
        assert!(get_events_by_type(storage.conn(), EventType::OrphansRemoved, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_failed_cleanup_aborts() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .save(&WorkoutSession::new("prof_1", None), "test")
            .unwrap();
        storage
            .conn()
            .execute_batch(
                "CREATE TRIGGER keep_sessions BEFORE DELETE ON workout_sessions
                 BEGIN SELECT RAISE(ABORT, 'sessions are locked'); END;",
            )
            .unwrap();

        assert!(optimize_database(&mut storage, "test").is_err());
        assert_eq!(storage.count::<WorkoutSession>(None).unwrap(), 1);
        assert!(get_events_by_type(storage.conn(), EventType::DatabaseOptimized, None)
            .unwrap()
            .is_empty());
    }
}
