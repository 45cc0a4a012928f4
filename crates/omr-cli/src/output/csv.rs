//! CSV results adapter.
//!
//! One row per sheet, in report order. Confidence is written with three
//! decimals.

use anyhow::Result;
use omr_core::{BatchReport, ReportOutput};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Column headings of the results table.
pub const HEADER: [&str; 7] = [
    "Student ID",
    "Score",
    "Correct",
    "Incorrect",
    "Blank",
    "Confidence",
    "Errors",
];

/// Writes per-sheet results as CSV.
pub struct CsvOutput {
    writer: Mutex<csv::Writer<Box<dyn Write + Send>>>,
}

impl CsvOutput {
    /// Creates a new CSV output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a new CSV output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(csv::Writer::from_writer(writer)),
        }
    }

    /// Creates (or truncates) `path` and writes CSV to it.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }
}

impl ReportOutput for CsvOutput {
    #[allow(clippy::significant_drop_tightening)]
    fn write(&self, report: &BatchReport) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.write_record(HEADER)?;
        for detail in &report.detailed_results {
            writer.write_record([
                detail.student_id.clone(),
                detail.score.to_string(),
                detail.correct_answers.to_string(),
                detail.incorrect_answers.to_string(),
                detail.blank_answers.to_string(),
                format!("{:.3}", detail.confidence),
                detail.errors.join("; "),
            ])?;
        }
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}
