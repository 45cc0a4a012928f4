//! OMR Core - Answer-sheet recognition pipeline
//!
//! This crate contains the domain types, the recognition stages (image
//! normalization, grid discovery, mark classification, scoring and batch
//! reporting), the concurrent batch runner and the port traits implemented by
//! adapters.

pub mod batch;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod ports;

pub use batch::{BatchOutcome, BatchRunner, CancellationToken};
pub use config::OmrConfig;
pub use domain::{
    Answer, AnswerGrid, AnswerKey, AnswerSheetResult, BatchReport, BoundingBox, ExamInfo,
    GridCell, PipelineAccuracy, QuestionMarks, Region, ReportSummary, ScoreDistribution,
    SheetDetail, SheetImage, MAX_OPTIONS, MULTIPLE_SENTINEL, UNKNOWN_STUDENT,
};
pub use error::OmrError;
pub use pipeline::{process_sheet, GradingContext, ReportAggregator, Scorer};
pub use ports::{NoProgress, ProgressEvent, ProgressSink, ReportOutput, SheetSource};
