//! Progress accounting for export and import runs.

use serde::{Deserialize, Serialize};

/// Point-in-time progress of a pipeline run, handed to callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStatus {
    pub total_records: usize,
    pub processed_records: usize,
    pub successful_records: usize,
    pub failed_records: usize,
    pub is_complete: bool,
    /// Warnings and per-record or per-chunk failures, in order.
    pub errors: Vec<String>,
}

/// Final status of an import.
pub type ImportStatus = ProgressStatus;

/// Owns a run's [`ProgressStatus`] and notifies the callback.
///
/// Counts only move forward and [`ProgressTracker::complete`] consumes the
/// tracker, so a callback sees `is_complete == true` exactly once, last.
pub struct ProgressTracker<F: FnMut(&ProgressStatus)> {
    status: ProgressStatus,
    on_progress: F,
}

impl<F: FnMut(&ProgressStatus)> ProgressTracker<F> {
    pub fn new(total_records: usize, on_progress: F) -> Self {
        Self {
            status: ProgressStatus {
                total_records,
                ..ProgressStatus::default()
            },
            on_progress,
        }
    }

    fn advance(&mut self, count: usize) {
        self.status.processed_records += count;
        debug_assert!(self.status.processed_records <= self.status.total_records);
    }

    /// Count `count` records as processed successfully.
    pub fn succeed(&mut self, count: usize) {
        self.advance(count);
        self.status.successful_records += count;
    }

    /// Count one failed record and keep its message.
    pub fn fail(&mut self, message: String) {
        self.fail_many(1, message);
    }

    /// Count `count` failed records under a single message.
    pub fn fail_many(&mut self, count: usize, message: String) {
        self.advance(count);
        self.status.failed_records += count;
        self.status.errors.push(message);
    }

    /// Keep a message without touching the counts.
    pub fn warn(&mut self, message: String) {
        self.status.errors.push(message);
    }

    /// Hand the current status to the callback.
    pub fn emit(&mut self) {
        (self.on_progress)(&self.status);
    }

    #[must_use]
    pub fn status(&self) -> &ProgressStatus {
        &self.status
    }

    /// Mark the run complete, emit once more and return the final status.
    pub fn complete(mut self) -> ProgressStatus {
        self.status.is_complete = true;
        (self.on_progress)(&self.status);
        self.status
    }
}
