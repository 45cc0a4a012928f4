//! Batch statistics over a set of sheet results.

use crate::domain::{
    AnswerSheetResult, BatchReport, PipelineAccuracy, ReportSummary, ScoreDistribution,
    SheetDetail,
};
use crate::error::OmrError;
use crate::pipeline::scoring::round_to;

/// Confidence above which a question reading counts as certain.
pub const HIGH_CONFIDENCE: f64 = 0.7;

/// Builds [`BatchReport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAggregator;

impl ReportAggregator {
    /// Computes the report for `results`.
    ///
    /// Pure: the same input always yields the same report.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::EmptyResultSet`] if `results` is empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn aggregate(results: &[AnswerSheetResult]) -> Result<BatchReport, OmrError> {
        if results.is_empty() {
            return Err(OmrError::EmptyResultSet);
        }
        let count = results.len() as f64;

        let average_score = results.iter().map(|r| r.score).sum::<f64>() / count;

        let sheet_confidences: Vec<f64> = results
            .iter()
            .filter_map(AnswerSheetResult::mean_confidence)
            .collect();
        let average_confidence = mean(&sheet_confidences).unwrap_or(0.0);

        let processing_errors: usize = results.iter().map(|r| r.processing_errors.len()).sum();
        let success_rate = (count - processing_errors as f64) / count * 100.0;

        let mut score_distribution = ScoreDistribution::default();
        for result in results {
            score_distribution.record(result.score);
        }

        let detailed_results = results.iter().map(detail).collect();

        Ok(BatchReport {
            summary: ReportSummary {
                total_sheets_processed: results.len(),
                average_score: round_to(average_score, 2),
                average_confidence: round_to(average_confidence, 3),
                processing_errors,
                success_rate: round_to(success_rate, 2),
            },
            score_distribution,
            detailed_results,
            pipeline_accuracy: PipelineAccuracy {
                mark_detection_accuracy: mark_detection_accuracy(results),
                grid_detection_success_rate: grid_detection_success_rate(results),
            },
        })
    }
}

/// Percentage of all question confidences above [`HIGH_CONFIDENCE`].
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn mark_detection_accuracy(results: &[AnswerSheetResult]) -> f64 {
    let (high, total) = results
        .iter()
        .flat_map(|r| r.confidence_scores.iter())
        .fold((0usize, 0usize), |(high, total), c| {
            (high + usize::from(*c > HIGH_CONFIDENCE), total + 1)
        });
    if total == 0 {
        return 0.0;
    }
    round_to(high as f64 / total as f64 * 100.0, 2)
}

/// Percentage of sheets with no processing errors.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn grid_detection_success_rate(results: &[AnswerSheetResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let ok = results.iter().filter(|r| r.is_success()).count();
    round_to(ok as f64 / results.len() as f64 * 100.0, 2)
}

fn detail(result: &AnswerSheetResult) -> SheetDetail {
    SheetDetail {
        student_id: result.student_id.clone(),
        score: round_to(result.score, 2),
        correct_answers: result.correct_answers,
        incorrect_answers: result.incorrect_answers,
        blank_answers: result.blank_answers,
        confidence: result
            .mean_confidence()
            .map_or(0.0, |c| round_to(c, 3)),
        errors: result.processing_errors.clone(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
