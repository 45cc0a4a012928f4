//! Batch report types.

use serde::{Deserialize, Serialize};

/// Batch-level statistics and per-sheet details.
///
/// Derived from a set of sheet results and never edited in place; build a new
/// report whenever the result set changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Headline statistics.
    pub summary: ReportSummary,
    /// Sheet counts per score band.
    pub score_distribution: ScoreDistribution,
    /// One entry per sheet, in input order.
    pub detailed_results: Vec<SheetDetail>,
    /// Detector-quality figures.
    pub pipeline_accuracy: PipelineAccuracy,
}

/// Headline statistics for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of sheets in the batch, failed ones included.
    pub total_sheets_processed: usize,
    /// Mean score, two decimals.
    pub average_score: f64,
    /// Mean of per-sheet mean confidences, three decimals.
    pub average_confidence: f64,
    /// Total number of processing-error messages across sheets.
    pub processing_errors: usize,
    /// `(sheets - errors) / sheets * 100`, two decimals.
    pub success_rate: f64,
}

/// Five fixed score bands.
///
/// Lower bounds are inclusive, upper bounds exclusive, except the top band
/// which includes 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    /// Scores in [90, 100].
    #[serde(rename = "90-100")]
    pub excellent: usize,
    /// Scores in [80, 90).
    #[serde(rename = "80-89")]
    pub good: usize,
    /// Scores in [70, 80).
    #[serde(rename = "70-79")]
    pub fair: usize,
    /// Scores in [60, 70).
    #[serde(rename = "60-69")]
    pub pass: usize,
    /// Scores in [0, 60).
    #[serde(rename = "0-59")]
    pub fail: usize,
}

impl ScoreDistribution {
    /// Adds one sheet with the given score to its band.
    pub fn record(&mut self, score: f64) {
        let bucket = if score >= 90.0 {
            &mut self.excellent
        } else if score >= 80.0 {
            &mut self.good
        } else if score >= 70.0 {
            &mut self.fair
        } else if score >= 60.0 {
            &mut self.pass
        } else {
            &mut self.fail
        };
        *bucket += 1;
    }

    /// Sum over all bands.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.excellent + self.good + self.fair + self.pass + self.fail
    }

    /// Bands as `(label, count)` pairs, highest band first.
    #[must_use]
    pub const fn buckets(&self) -> [(&'static str, usize); 5] {
        [
            ("90-100", self.excellent),
            ("80-89", self.good),
            ("70-79", self.fair),
            ("60-69", self.pass),
            ("0-59", self.fail),
        ]
    }
}

/// Report row for a single sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetDetail {
    /// Student identifier.
    pub student_id: String,
    /// Score, two decimals.
    pub score: f64,
    /// Correct answers.
    pub correct_answers: usize,
    /// Incorrect answers.
    pub incorrect_answers: usize,
    /// Blank answers.
    pub blank_answers: usize,
    /// Mean confidence, three decimals; 0 when the sheet has none.
    pub confidence: f64,
    /// Processing errors.
    pub errors: Vec<String>,
}

/// Proxy metrics for how well the detector performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineAccuracy {
    /// Percentage of question confidences above 0.7, two decimals.
    pub mark_detection_accuracy: f64,
    /// Percentage of sheets without processing errors, two decimals.
    pub grid_detection_success_rate: f64,
}
