//! Status command implementation.

use crate::cli::commands::open_storage;
use crate::config::resolve_db_path;
use crate::error::Result;
use crate::storage::StoreCounts;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Output for status command.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput {
    database: Option<PathBuf>,
    counts: StoreCounts,
    total: usize,
}

/// Execute status command.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let counts = storage.store_counts()?;
    let database = resolve_db_path(db_path.map(|p| p.as_path()));

    if json {
        let output = StatusOutput {
            database,
            total: counts.total(),
            counts,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", "Liftlog Status".bold());
    println!("==============");
    if let Some(path) = &database {
        println!("Database: {}", path.display());
    }
    println!();
    println!("  Profiles:           {}", counts.profiles);
    println!("  Exercises:          {}", counts.exercises);
    println!("  Templates:          {}", counts.exercise_templates);
    println!("  Training plans:     {}", counts.training_plans);
    println!("  Workout sessions:   {}", counts.workout_sessions);
    println!("  Workout logs:       {}", counts.workout_logs);
    println!("  Max logs:           {}", counts.max_logs);
    println!("  Body metrics:       {}", counts.body_metrics);
    println!();
    println!("  Total: {}", counts.total());

    Ok(())
}
