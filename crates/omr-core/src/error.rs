//! Error taxonomy for the recognition pipeline.

use thiserror::Error;

/// Errors raised by the grading pipeline.
///
/// `InvalidImage` and `InsufficientRegions` are sheet-level: they are caught at
/// the single-sheet boundary and recorded on the sheet's result. `AnswerKey`
/// and `InvalidConfig` are batch-fatal and reach the caller before any sheet is
/// processed.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OmrError {
    /// The input image could not be decoded or has zero area.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Too few candidate bubbles survived the area filter to form a grid.
    #[error("insufficient regions detected: found {found}, need at least {required}. Check image quality.")]
    InsufficientRegions {
        /// Regions that survived the area filter.
        found: usize,
        /// Minimum required (`min_questions * min_options`).
        required: usize,
    },

    /// The answer key is missing or malformed.
    #[error("answer key error: {0}")]
    AnswerKey(String),

    /// A report was requested for an empty result set.
    #[error("no results to report")]
    EmptyResultSet,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The batch worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}
