//! Recognition pipeline stages.
//!
//! Each stage consumes the previous stage's output:
//! image → [`Preprocessor`] → mask → [`GridDetector`] → grid →
//! [`MarkDetector`] → answers → [`Scorer`] → sheet result, and
//! [`ReportAggregator`] summarizes many sheet results.

mod grid;
mod marks;
mod preprocess;
mod report;
mod scoring;
mod sheet;

pub use grid::{cluster_rows, extract_regions, GridDetector};
pub use marks::{
    classify, fill_ratio, MarkDetector, QuestionReading, BLANK_CONFIDENCE,
    MULTIPLE_MARK_CONFIDENCE, SINGLE_MARK_CONFIDENCE,
};
pub use preprocess::{Preprocessor, BACKGROUND, FOREGROUND};
pub use report::{
    grid_detection_success_rate, mark_detection_accuracy, ReportAggregator, HIGH_CONFIDENCE,
};
pub use scoring::{round_to, ScoreTally, Scorer};
pub use sheet::{process_sheet, try_process_sheet, GradingContext};
