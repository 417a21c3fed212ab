//! Bulk maintenance for the local store.
//!
//! - [`BulkDeleter`]: `ALL`, `OLD_DATA` and `INACTIVE_PROFILES` strategies
//! - [`optimize_database`]: statistics, indexes and orphaned session cleanup
//! - [`validate_data_integrity`]: schema checks and dangling profile references
//!
//! Failures on individual records are collected into the results; only
//! invalid input or an unreadable store fail the call.

mod bulk_delete;
mod integrity;
mod optimize;
mod types;

pub use bulk_delete::{retention_cutoff, BulkDeleter, RETENTION_MONTHS};
pub use integrity::validate_data_integrity;
pub use optimize::{optimize_database, remove_orphaned_sessions};
pub use types::{BulkDeleteOption, CleanupResult, IntegrityReport, OptimizeResult};
