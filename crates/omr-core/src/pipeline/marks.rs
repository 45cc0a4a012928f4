//! Mark classification from per-bubble fill ratios.

use image::{imageops, GenericImageView, GrayImage};
use tracing::warn;

use crate::config::OmrConfig;
use crate::domain::{Answer, AnswerGrid, BoundingBox, QuestionMarks, MAX_OPTIONS};
use crate::pipeline::preprocess::FOREGROUND;

/// Confidence for a question with exactly one marked option.
pub const SINGLE_MARK_CONFIDENCE: f64 = 0.9;
/// Confidence for a question with several marked options.
pub const MULTIPLE_MARK_CONFIDENCE: f64 = 0.3;
/// Confidence for a question with no marked option.
pub const BLANK_CONFIDENCE: f64 = 0.0;

/// Classification of one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReading {
    /// Detected answer.
    pub answer: Answer,
    /// Detector confidence in [0, 1].
    pub confidence: f64,
    /// Raw per-option measurements.
    pub marks: QuestionMarks,
}

/// Measures bubble fill and classifies each question.
#[derive(Debug, Clone)]
pub struct MarkDetector {
    threshold: f64,
    min_options: usize,
}

impl MarkDetector {
    /// Creates a detector from the pipeline configuration.
    #[must_use]
    pub const fn new(config: &OmrConfig) -> Self {
        Self {
            threshold: config.mark_threshold,
            min_options: config.min_options,
        }
    }

    /// Measures and classifies every question row of `grid`.
    #[must_use]
    pub fn run(&self, mask: &GrayImage, grid: &AnswerGrid) -> Vec<QuestionReading> {
        self.measure(mask, grid)
            .into_iter()
            .map(|marks| {
                let (answer, confidence) = classify(&marks);
                QuestionReading {
                    answer,
                    confidence,
                    marks,
                }
            })
            .collect()
    }

    /// Per-row fill ratios and marked flags.
    ///
    /// Rows with fewer cells than `min_options` are padded with unmarked
    /// options. Cells past the 26th option ('Z') are ignored.
    #[must_use]
    pub fn measure(&self, mask: &GrayImage, grid: &AnswerGrid) -> Vec<QuestionMarks> {
        grid.rows()
            .iter()
            .enumerate()
            .map(|(question, row)| {
                if row.len() > MAX_OPTIONS {
                    warn!(
                        question,
                        cells = row.len(),
                        "row has more bubbles than lettered options; extra cells ignored"
                    );
                }
                let mut fill_ratios: Vec<f64> = row
                    .iter()
                    .take(MAX_OPTIONS)
                    .map(|cell| fill_ratio(mask, &cell.region.bbox))
                    .collect();
                if fill_ratios.len() < self.min_options {
                    fill_ratios.resize(self.min_options, 0.0);
                }
                let marked = fill_ratios.iter().map(|r| *r > self.threshold).collect();
                QuestionMarks {
                    marked,
                    fill_ratios,
                }
            })
            .collect()
    }
}

/// Maps a question's marks to an answer and confidence.
///
/// No mark is blank, one mark is that option's letter, several marks are
/// [`Answer::Multiple`]. A single mark past 'Z' has no letter and reads as
/// blank.
#[must_use]
pub fn classify(marks: &QuestionMarks) -> (Answer, f64) {
    match (marks.marked_count(), marks.first_marked()) {
        (1, Some(index)) => Answer::from_option_index(index).map_or(
            (Answer::Blank, BLANK_CONFIDENCE),
            |answer| (answer, SINGLE_MARK_CONFIDENCE),
        ),
        (0, _) | (_, None) => (Answer::Blank, BLANK_CONFIDENCE),
        _ => (Answer::Multiple, MULTIPLE_MARK_CONFIDENCE),
    }
}

/// Fraction of foreground pixels inside `bbox`, clipped to the mask.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn fill_ratio(mask: &GrayImage, bbox: &BoundingBox) -> f64 {
    let view = imageops::crop_imm(mask, bbox.x, bbox.y, bbox.width, bbox.height);
    let total = u64::from(view.width()) * u64::from(view.height());
    if total == 0 {
        return 0.0;
    }
    let filled = view
        .pixels()
        .filter(|(_, _, p)| p.0[0] == FOREGROUND)
        .count();
    filled as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Region;
    use image::Luma;

    fn marks(flags: &[bool]) -> QuestionMarks {
        QuestionMarks {
            marked: flags.to_vec(),
            fill_ratios: flags.iter().map(|m| if *m { 0.8 } else { 0.1 }).collect(),
        }
    }

    fn cell_region(x: u32, y: u32) -> Region {
        Region {
            bbox: BoundingBox::new(x, y, 10, 10),
            area: 81.0,
        }
    }

    #[test]
    fn test_classify_blank() {
        assert_eq!(
            classify(&marks(&[false, false, false, false])),
            (Answer::Blank, BLANK_CONFIDENCE)
        );
    }

    #[test]
    fn test_classify_single() {
        assert_eq!(
            classify(&marks(&[false, false, true, false])),
            (Answer::Choice('C'), SINGLE_MARK_CONFIDENCE)
        );
    }

    #[test]
    fn test_classify_two_marks_is_ambiguous() {
        let (answer, confidence) = classify(&marks(&[true, false, true, false]));
        assert_eq!(answer, Answer::Multiple);
        assert!((confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_fill_ratio_counts_foreground() {
        let mut mask = GrayImage::new(20, 20);
        for y in 0..5 {
            for x in 0..10 {
                mask.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
        let ratio = fill_ratio(&mask, &BoundingBox::new(0, 0, 10, 10));
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_fill_ratio_clips_to_mask() {
        let mask = GrayImage::from_pixel(10, 10, Luma([FOREGROUND]));
        let ratio = fill_ratio(&mask, &BoundingBox::new(5, 5, 20, 20));
        assert!((ratio - 1.0).abs() < 1e-9);
        let outside = fill_ratio(&mask, &BoundingBox::new(50, 50, 5, 5));
        assert!(outside.abs() < f64::EPSILON);
    }

    #[test]
    fn test_measure_pads_short_rows() {
        let mut mask = GrayImage::new(100, 20);
        for y in 0..10 {
            for x in 30..40 {
                mask.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
        let row = vec![cell_region(0, 0), cell_region(30, 0)];
        let grid = AnswerGrid::from_rows(vec![row.clone()], row);
        let detector = MarkDetector::new(&OmrConfig::default());

        let readings = detector.run(&mask, &grid);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].marks.marked, [false, true, false, false]);
        assert_eq!(readings[0].marks.fill_ratios.len(), 4);
        assert_eq!(readings[0].answer, Answer::Choice('B'));
    }

    #[test]
    fn test_unlettered_option_reads_blank() {
        let mut flags = vec![false; 28];
        flags[27] = true;
        assert_eq!(classify(&marks(&flags)), (Answer::Blank, BLANK_CONFIDENCE));
    }

    #[test]
    fn test_measure_caps_row_at_lettered_options() {
        let mask = GrayImage::from_pixel(28 * 10, 10, Luma([FOREGROUND]));
        let row: Vec<Region> = (0..28).map(|i| cell_region(i * 10, 0)).collect();
        let grid = AnswerGrid::from_rows(vec![row.clone()], row);

        let measured = MarkDetector::new(&OmrConfig::default()).measure(&mask, &grid);
        assert_eq!(measured[0].fill_ratios.len(), MAX_OPTIONS);
        assert_eq!(measured[0].marked.len(), MAX_OPTIONS);
    }

    #[test]
    fn test_threshold_is_strict() {
        let config = OmrConfig {
            mark_threshold: 0.5,
            ..OmrConfig::default()
        };
        let mut mask = GrayImage::new(10, 10);
        for y in 0..5 {
            for x in 0..10 {
                mask.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
        let row = vec![cell_region(0, 0)];
        let grid = AnswerGrid::from_rows(vec![row.clone()], row);
        let measured = MarkDetector::new(&config).measure(&mask, &grid);
        // Exactly at the threshold is not a mark.
        assert!(!measured[0].marked[0]);
    }
}
