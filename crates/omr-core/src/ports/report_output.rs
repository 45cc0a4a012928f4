//! Report output port for writing batch reports.

use crate::domain::BatchReport;

/// Port for outputting batch reports.
pub trait ReportOutput: Send + Sync {
    /// Writes a batch report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &BatchReport) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
