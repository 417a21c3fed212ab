//! Snapshot export and import.
//!
//! - **Export**: one profile's data → a versioned [`Snapshot`], chunk by chunk
//! - **Import**: a [`Snapshot`] → SQLite, one transaction per chunk, with
//!   per-record failure accounting and conflict detection
//! - **Files**: atomic snapshot writes and validated reads
//! - **Hashing**: SHA-256 digest identifying a snapshot's content
//!
//! # File Format
//!
//! A snapshot is a single JSON document:
//! ```json
//! {"version":"1.0.0","exportedAt":"2025-01-20T10:00:00+00:00","profiles":[...],"exercises":[...],
//!  "exerciseTemplates":[...],"trainingPlans":[...],"workoutLogs":[...],"maxLogs":[...],"bodyMetrics":[...]}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use liftlog::sync::{Exporter, Importer, write_snapshot, read_snapshot};
//!
//! let snapshot = Exporter::new(&storage).export("prof_123", |status| {
//!     eprintln!("{}/{}", status.processed_records, status.total_records);
//! })?;
//! write_snapshot(&path, &snapshot)?;
//!
//! let status = Importer::new(&mut storage, "me").import(&read_snapshot(&path)?, |_| {})?;
//! ```

mod chunker;
mod export;
mod file;
mod hash;
mod import;
mod progress;
mod types;

pub use chunker::chunk;
pub use export::Exporter;
pub use file::{atomic_write, read_snapshot, write_snapshot};
pub use hash::{content_hash, snapshot_digest};
pub use import::Importer;
pub use progress::{ImportStatus, ProgressStatus, ProgressTracker};
pub use types::{
    ConflictDescriptor, ConflictEntry, ConflictKind, EntityKind, Snapshot, CONFLICT_THRESHOLD,
    DEFAULT_CHUNK_SIZE, EXPORT_VERSION,
};
