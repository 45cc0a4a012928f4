//! Progress reporting port for UI integration.

use crate::domain::AnswerSheetResult;

/// Events emitted during a batch run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Grading started for a sheet.
    Started {
        /// Sheet name.
        name: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total sheets in the batch.
        total: usize,
    },
    /// A sheet was graded.
    Completed {
        /// Sheet name.
        name: String,
        /// The grading result.
        result: AnswerSheetResult,
    },
    /// A sheet failed; its failure is recorded on the result.
    Failed {
        /// Sheet name.
        name: String,
        /// Reason for the failure.
        reason: String,
    },
    /// The batch is over.
    Finished {
        /// Sheets graded successfully.
        processed: usize,
        /// Sheets that failed.
        failed: usize,
        /// Sheets abandoned by cancellation before they started.
        cancelled: usize,
    },
}

/// Port for receiving progress events.
///
/// Events may arrive from several worker threads at once.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}
