//! Core domain types for answer-sheet grading.

mod answer_key;
mod grid;
mod report;
mod sheet;

pub use answer_key::{AnswerKey, ExamInfo};
pub use grid::{AnswerGrid, BoundingBox, GridCell, QuestionMarks, Region};
pub use report::{BatchReport, PipelineAccuracy, ReportSummary, ScoreDistribution, SheetDetail};
pub use sheet::{
    Answer, AnswerSheetResult, SheetImage, MAX_OPTIONS, MULTIPLE_SENTINEL, UNKNOWN_STUDENT,
};
