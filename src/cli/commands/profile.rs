//! Profile command implementations.

use crate::cli::commands::open_storage;
use crate::cli::ProfileCommands;
use crate::config::default_actor;
use crate::error::Result;
use crate::model::Profile;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Output for profile list.
#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<Profile>,
    count: usize,
}

/// Execute profile commands.
pub fn execute(
    command: &ProfileCommands,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        ProfileCommands::List { active } => list(*active, db_path, json),
        ProfileCommands::Create {
            name,
            email,
            inactive,
        } => create(name, email.as_deref(), *inactive, db_path, actor, json),
    }
}

fn list(active_only: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let profiles: Vec<Profile> = storage
        .find_all::<Profile>(None)?
        .into_iter()
        .filter(|p| !active_only || p.is_active)
        .collect();

    if json {
        let output = ProfileListOutput {
            count: profiles.len(),
            profiles,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No profiles found.");
        return Ok(());
    }

    println!("{}", format!("Profiles ({})", profiles.len()).bold());
    for profile in &profiles {
        let state = if profile.is_active {
            "active".green()
        } else {
            "inactive".dimmed()
        };
        match &profile.email {
            Some(email) => println!("  {}  {} <{email}> [{state}]", profile.id.cyan(), profile.name),
            None => println!("  {}  {} [{state}]", profile.id.cyan(), profile.name),
        }
    }

    Ok(())
}

fn create(
    name: &str,
    email: Option<&str>,
    inactive: bool,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db_path)?;
    let actor = actor.map(ToString::to_string).unwrap_or_else(default_actor);

    let mut profile = Profile::new(name).with_active(!inactive);
    if let Some(email) = email {
        profile = profile.with_email(email);
    }

    storage.save(&profile, &actor)?;

    if json {
        println!("{}", serde_json::to_string(&profile)?);
    } else {
        println!("Created profile {} ({})", profile.name.bold(), profile.id.cyan());
    }

    Ok(())
}
