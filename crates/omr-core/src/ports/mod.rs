//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the grading core and external adapters.

mod progress;
mod report_output;
mod sheet_source;

pub use progress::{NoProgress, ProgressEvent, ProgressSink};
pub use report_output::ReportOutput;
pub use sheet_source::SheetSource;
