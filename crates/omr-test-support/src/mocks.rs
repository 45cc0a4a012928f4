//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use omr_core::batch::CancellationToken;
use omr_core::domain::{BatchReport, SheetImage};
use omr_core::error::OmrError;
use omr_core::ports::{ProgressEvent, ProgressSink, ReportOutput, SheetSource};

/// Mock implementation of `SheetSource` for testing.
///
/// Serves pre-built sheets, optionally interleaved with names that fail to
/// load, and counts load calls.
pub struct MockSheetSource {
    entries: Vec<(String, Result<SheetImage, OmrError>)>,
    load_count: Arc<Mutex<usize>>,
}

impl MockSheetSource {
    /// Creates a new mock source with the given sheets.
    #[must_use]
    pub fn new(sheets: Vec<SheetImage>) -> Self {
        Self {
            entries: sheets.into_iter().map(|s| (s.name.clone(), Ok(s))).collect(),
            load_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Appends a sheet name whose load fails with `error`.
    #[must_use]
    pub fn with_failure(mut self, name: impl Into<String>, error: OmrError) -> Self {
        self.entries.push((name.into(), Err(error)));
        self
    }

    /// Returns the number of `load` calls.
    #[must_use]
    pub fn load_count(&self) -> usize {
        *self
            .load_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SheetSource for MockSheetSource {
    fn sheet_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    fn load(&self, name: &str) -> Result<SheetImage, OmrError> {
        if let Ok(mut c) = self.load_count.lock() {
            *c += 1;
        }
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map_or_else(
                || Err(OmrError::InvalidImage(format!("no such sheet: {name}"))),
                |(_, entry)| entry.clone(),
            )
    }
}

/// Mock implementation of `ReportOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockReportOutput {
    reports: Arc<Mutex<Vec<BatchReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockReportOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<BatchReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockReportOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportOutput for MockReportOutput {
    fn write(&self, report: &BatchReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions, and can cancel a batch once a
/// given number of sheets have been graded.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
    cancel_after: Option<(CancellationToken, usize)>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            cancel_after: None,
        }
    }

    /// Creates a sink that cancels `token` after `completed` sheets finish.
    #[must_use]
    pub fn cancelling(token: CancellationToken, completed: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            cancel_after: Some((token, completed)),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Failed` events.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Failed { .. }))
            .count()
    }

    /// Returns whether a `Finished` event was received.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Finished { .. }))
    }

    /// Returns `(processed, failed, cancelled)` from the `Finished` event.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                processed,
                failed,
                cancelled,
            } => Some((*processed, *failed, *cancelled)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        events.push(event);

        if let Some((token, after)) = &self.cancel_after {
            let done = events
                .iter()
                .filter(|e| {
                    matches!(
                        e,
                        ProgressEvent::Completed { .. } | ProgressEvent::Failed { .. }
                    )
                })
                .count();
            if done >= *after {
                token.cancel();
            }
        }
    }
}
