//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Liftlog CLI - backup, restore and maintenance for a local training log
#[derive(Parser, Debug)]
#[command(name = "liftlog", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.liftlog/data/liftlog.db)
    #[arg(long, global = true, env = "LIFTLOG_DB")]
    pub db: Option<PathBuf>,

    /// Actor name for audit trail
    #[arg(long, global = true, env = "LIFTLOG_ACTOR")]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and apply the schema
    Init {
        /// Overwrite existing database
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,

    /// Profile management
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Export one profile's data to a snapshot file
    Export {
        /// Profile to export
        #[arg(long)]
        profile: String,

        /// Snapshot file to write (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Records per chunk (default: 100, or LIFTLOG_CHUNK_SIZE)
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Import a snapshot file
    Import {
        /// Snapshot file to read
        file: PathBuf,

        /// Records per chunk (default: 100, or LIFTLOG_CHUNK_SIZE)
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Bulk delete, optimization and integrity checks
    Maintenance {
        #[command(subcommand)]
        command: MaintenanceCommands,
    },

    /// Show record counts per collection
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Profile Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List profiles
    List {
        /// Only show active profiles
        #[arg(long)]
        active: bool,
    },

    /// Create a profile
    Create {
        /// Display name
        name: String,

        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Create the profile as inactive
        #[arg(long)]
        inactive: bool,
    },
}

// ============================================================================
// Maintenance Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum MaintenanceCommands {
    /// Delete data in bulk
    BulkDelete {
        /// ALL, OLD_DATA or INACTIVE_PROFILES (synonyms accepted)
        option: String,

        /// Records per chunk (default: 100, or LIFTLOG_CHUNK_SIZE)
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Analyze, reindex and remove orphaned workout sessions
    Optimize,

    /// Check records for schema violations and dangling profile references
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from([
            "liftlog", "export", "--profile", "prof_1", "-o", "out.json", "--chunk-size", "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                profile,
                output,
                chunk_size,
            } => {
                assert_eq!(profile, "prof_1");
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert_eq!(chunk_size, Some(10));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["liftlog", "status", "--json", "--db", "x.db", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_bulk_delete() {
        let cli = Cli::try_parse_from(["liftlog", "maintenance", "bulk-delete", "old"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Maintenance {
                command: MaintenanceCommands::BulkDelete { ref option, .. }
            } if option == "old"
        ));
    }
}
