//! Output formatting for CLI.

mod csv;
mod json;
mod progress;

pub use self::csv::CsvOutput;
pub use json::JsonOutput;
pub use progress::ProgressBar;
