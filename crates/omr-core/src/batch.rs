//! Concurrent batch grading.
//!
//! Sheets are independent, so a batch fans out over a bounded rayon pool.
//! Each worker loads, decodes and grades its own sheet; the only shared data
//! is the read-only [`GradingContext`]. Results come back in submission order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{AnswerSheetResult, BatchReport};
use crate::error::OmrError;
use crate::pipeline::{process_sheet, GradingContext, ReportAggregator};
use crate::ports::{ProgressEvent, ProgressSink, SheetSource};

/// Shared flag for abandoning the sheets of a batch that have not started.
///
/// Sheets already in flight finish normally and keep their results.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`CancellationToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Results of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One result per attempted sheet, in submission order.
    pub results: Vec<AnswerSheetResult>,
    /// Sheets abandoned before they started.
    pub cancelled: usize,
}

impl BatchOutcome {
    /// Sheets graded without errors.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Sheets that recorded a processing error.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.processed()
    }

    /// Builds the batch report for the attempted sheets.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::EmptyResultSet`] if no sheet was attempted.
    pub fn report(&self) -> Result<BatchReport, OmrError> {
        ReportAggregator::aggregate(&self.results)
    }
}

/// Runs a batch of sheets over a bounded worker pool.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    workers: usize,
    cancel: CancellationToken,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRunner {
    /// Creates a runner with one worker per available core.
    #[must_use]
    pub fn new() -> Self {
        let workers = thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self {
            workers,
            cancel: CancellationToken::new(),
        }
    }

    /// Overrides the worker count (at least one worker is always used).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Uses `token` to observe cancellation requests.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Number of worker threads.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Grades every sheet of `source`.
    ///
    /// Sheet-level failures are recorded on their results and never abort
    /// the batch.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::WorkerPool`] if the thread pool cannot be created.
    pub fn run(
        &self,
        source: &dyn SheetSource,
        ctx: &GradingContext,
        progress: &dyn ProgressSink,
    ) -> Result<BatchOutcome, OmrError> {
        let names = source.sheet_names();
        let total = names.len();
        info!(sheets = total, workers = self.workers, "starting batch");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("omr-worker-{i}"))
            .build()
            .map_err(|e| OmrError::WorkerPool(e.to_string()))?;

        let slots: Vec<Option<AnswerSheetResult>> = pool.install(|| {
            names
                .par_iter()
                .enumerate()
                .map(|(index, name)| {
                    if self.cancel.is_cancelled() {
                        debug!(sheet = %name, "skipping sheet after cancellation");
                        return None;
                    }
                    Some(grade_one(source, ctx, progress, name, index, total))
                })
                .collect()
        });

        let cancelled = slots.iter().filter(|s| s.is_none()).count();
        let outcome = BatchOutcome {
            results: slots.into_iter().flatten().collect(),
            cancelled,
        };

        progress.on_event(ProgressEvent::Finished {
            processed: outcome.processed(),
            failed: outcome.failed(),
            cancelled,
        });
        info!(
            processed = outcome.processed(),
            failed = outcome.failed(),
            cancelled,
            "batch finished"
        );
        Ok(outcome)
    }
}

fn grade_one(
    source: &dyn SheetSource,
    ctx: &GradingContext,
    progress: &dyn ProgressSink,
    name: &str,
    index: usize,
    total: usize,
) -> AnswerSheetResult {
    progress.on_event(ProgressEvent::Started {
        name: name.to_string(),
        index,
        total,
    });

    let result = match source.load(name) {
        Ok(sheet) => process_sheet(&sheet, ctx),
        Err(e) => ctx.failure(&e),
    };

    if result.is_success() {
        progress.on_event(ProgressEvent::Completed {
            name: name.to_string(),
            result: result.clone(),
        });
    } else {
        progress.on_event(ProgressEvent::Failed {
            name: name.to_string(),
            reason: result.processing_errors.join("; "),
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_worker_count_is_bounded_below() {
        let runner = BatchRunner::new().with_workers(0);
        assert_eq!(runner.workers(), 1);
        assert!(BatchRunner::new().workers() >= 1);
    }

    #[test]
    fn test_outcome_counts() {
        let mut ok = AnswerSheetResult::failed(1, "x");
        ok.processing_errors.clear();
        let outcome = BatchOutcome {
            results: vec![ok, AnswerSheetResult::failed(1, "boom")],
            cancelled: 3,
        };
        assert_eq!(outcome.processed(), 1);
        assert_eq!(outcome.failed(), 1);
    }

    #[test]
    fn test_empty_outcome_cannot_report() {
        let outcome = BatchOutcome::default();
        assert!(matches!(outcome.report(), Err(OmrError::EmptyResultSet)));
    }
}
