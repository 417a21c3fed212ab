//! Maintenance command implementations.

use crate::cli::commands::{open_storage, progress_printer};
use crate::cli::MaintenanceCommands;
use crate::config::{default_actor, resolve_chunk_size};
use crate::error::Result;
use crate::maintenance::{optimize_database, validate_data_integrity, BulkDeleter};
use colored::Colorize;
use std::path::PathBuf;

/// Execute maintenance commands.
pub fn execute(
    command: &MaintenanceCommands,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let actor = actor.map(ToString::to_string).unwrap_or_else(default_actor);
    match command {
        MaintenanceCommands::BulkDelete { option, chunk_size } => {
            bulk_delete(option, *chunk_size, db_path, &actor, json, quiet)
        }
        MaintenanceCommands::Optimize => optimize(db_path, &actor, json),
        MaintenanceCommands::Validate => validate(db_path, json),
    }
}

fn bulk_delete(
    option: &str,
    chunk_size: Option<usize>,
    db_path: Option<&PathBuf>,
    actor: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let chunk_size = resolve_chunk_size(chunk_size)?;
    let mut storage = open_storage(db_path)?;

    let result = BulkDeleter::new(&mut storage, actor)
        .with_chunk_size(chunk_size)
        .run_named(option, progress_printer("Deleting", !json && !quiet))?;

    if json {
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    println!("Bulk delete complete");
    println!();
    let rows = [
        ("Profiles", result.profiles),
        ("Exercises", result.exercises),
        ("Templates", result.exercise_templates),
        ("Training plans", result.training_plans),
        ("Workout logs", result.workout_logs),
        ("Max logs", result.max_logs),
        ("Body metrics", result.body_metrics),
    ];
    for (label, count) in rows.iter().filter(|(_, count)| *count > 0) {
        println!("  {:<16} {count}", format!("{label}:"));
    }
    println!();
    println!("  Total deleted: {}", result.total_deleted.to_string().bold());

    if !result.errors.is_empty() {
        println!();
        println!("{}", format!("Errors ({})", result.errors.len()).red().bold());
        for error in &result.errors {
            println!("  • {error}");
        }
    }

    Ok(())
}

fn optimize(db_path: Option<&PathBuf>, actor: &str, json: bool) -> Result<()> {
    let mut storage = open_storage(db_path)?;
    let result = optimize_database(&mut storage, actor)?;

    if json {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        println!("{}", result.message.green());
        for op in &result.operations_performed {
            println!("  ✓ {op}");
        }
    }

    Ok(())
}

fn validate(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let report = validate_data_integrity(&storage)?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    if report.is_valid {
        println!(
            "{} ({} records checked)",
            "No integrity issues found".green(),
            report.total_records_checked
        );
    } else {
        println!(
            "{} ({} records checked)",
            format!("{} integrity issues found", report.issues.len()).red().bold(),
            report.total_records_checked
        );
        for issue in &report.issues {
            println!("  • {issue}");
        }
    }

    Ok(())
}
