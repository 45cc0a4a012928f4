//! Single-sheet processing boundary.

use tracing::{debug, warn};

use crate::config::OmrConfig;
use crate::domain::{AnswerKey, AnswerSheetResult, SheetImage};
use crate::error::OmrError;
use crate::pipeline::{GridDetector, MarkDetector, Preprocessor, Scorer};

/// Everything a worker needs to grade a sheet.
///
/// Immutable once built, so one context can be shared by reference across
/// concurrent workers.
#[derive(Debug, Clone)]
pub struct GradingContext {
    config: OmrConfig,
    key: AnswerKey,
}

impl GradingContext {
    /// Validates `config` and pairs it with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::InvalidConfig`] if the configuration is out of range.
    pub fn new(config: OmrConfig, key: AnswerKey) -> Result<Self, OmrError> {
        config.validate()?;
        Ok(Self { config, key })
    }

    /// The pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &OmrConfig {
        &self.config
    }

    /// The answer key.
    #[must_use]
    pub const fn key(&self) -> &AnswerKey {
        &self.key
    }

    /// Result recorded for a sheet that failed with `error`.
    #[must_use]
    pub fn failure(&self, error: &OmrError) -> AnswerSheetResult {
        AnswerSheetResult::failed(self.key.len(), format!("Processing error: {error}"))
    }
}

/// Grades one sheet, recording any sheet-level failure on the result.
///
/// Never fails: errors become a result with student id `UNKNOWN`, zeroed
/// counts and one message in `processing_errors`.
#[must_use]
pub fn process_sheet(sheet: &SheetImage, ctx: &GradingContext) -> AnswerSheetResult {
    match try_process_sheet(sheet, ctx) {
        Ok(result) => {
            debug!(
                sheet = %sheet.name,
                score = result.score,
                correct = result.correct_answers,
                "graded sheet"
            );
            result
        }
        Err(e) => {
            warn!(sheet = %sheet.name, "failed to grade sheet: {e}");
            ctx.failure(&e)
        }
    }
}

/// Grades one sheet, returning the first stage error.
///
/// # Errors
///
/// Returns [`OmrError::InvalidImage`] for unusable images and
/// [`OmrError::InsufficientRegions`] when no grid can be found.
pub fn try_process_sheet(
    sheet: &SheetImage,
    ctx: &GradingContext,
) -> Result<AnswerSheetResult, OmrError> {
    let config = ctx.config();

    let mask = Preprocessor::new(config).run(&sheet.image)?;
    let grid = GridDetector::new(config).run(&mask)?;
    let readings = MarkDetector::new(config).run(&mask, &grid);

    let (answers, confidence_scores): (Vec<_>, Vec<_>) =
        readings.iter().map(|r| (r.answer, r.confidence)).unzip();
    let tally = Scorer::new(config.weighted_scoring).score(&answers, ctx.key());

    Ok(AnswerSheetResult {
        student_id: sheet.student_id(),
        answers,
        confidence_scores,
        total_questions: ctx.key().len(),
        correct_answers: tally.correct,
        incorrect_answers: tally.incorrect,
        blank_answers: tally.blank,
        score: tally.score,
        processing_errors: Vec::new(),
    })
}
