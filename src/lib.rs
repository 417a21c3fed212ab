//! Liftlog CLI - backup, restore and maintenance for a local training log
//!
//! This crate provides the core functionality for the `liftlog` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Profile, Exercise, TrainingPlan, WorkoutLog, MaxLog, body metrics)
//! - [`storage`] - SQLite database layer
//! - [`sync`] - Chunked snapshot export/import with progress and conflict detection
//! - [`maintenance`] - Bulk delete, optimization and integrity checks
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod model;
pub mod storage;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};
