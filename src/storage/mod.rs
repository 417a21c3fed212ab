//! SQLite storage layer for Liftlog.
//!
//! This module provides the persistence layer using SQLite with:
//! - WAL mode for concurrent reads
//! - Transaction discipline for atomic writes
//! - A generic, transaction-aware repository (`Entity`)
//! - Audit events for history
//!
//! # Submodules
//!
//! - [`entity`] - Row mapping and generic find/list/upsert/delete
//! - [`events`] - Audit event storage
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

pub mod entity;
pub mod events;
pub mod migrations;
pub mod schema;
pub mod sqlite;

pub use entity::{count_in, delete_in, find_in, list_in, upsert_in, Entity, UpsertOutcome};
pub use sqlite::{MutationContext, SqliteStorage, StoreCounts};
