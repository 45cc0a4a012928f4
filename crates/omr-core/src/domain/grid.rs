//! Geometry produced by grid detection and consumed by mark detection.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels (inclusive of both edges).
    pub width: u32,
    /// Height in pixels (inclusive of both edges).
    pub height: u32,
}

impl BoundingBox {
    /// Creates a bounding box.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A connected foreground component: one candidate bubble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Bounding box of the component's outer border.
    pub bbox: BoundingBox,
    /// Area enclosed by the outer border, in px².
    pub area: f64,
}

/// A region placed on the answer grid.
///
/// `row` is the 0-based question number, `column` the option index
/// (0 = 'A', 1 = 'B', ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Question index.
    pub row: usize,
    /// Option index.
    pub column: usize,
    /// The underlying region.
    pub region: Region,
}

/// Ordered grid of cells plus the flat list of accepted regions.
///
/// Rows run top-to-bottom; within a row, cells run left-to-right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerGrid {
    rows: Vec<Vec<GridCell>>,
    regions: Vec<Region>,
}

impl AnswerGrid {
    /// Assembles a grid from rows of regions already ordered top-to-bottom and
    /// left-to-right, assigning row and column indices.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<Region>>, regions: Vec<Region>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row, members)| {
                members
                    .into_iter()
                    .enumerate()
                    .map(|(column, region)| GridCell {
                        row,
                        column,
                        region,
                    })
                    .collect()
            })
            .collect();
        Self { rows, regions }
    }

    /// Rows of cells, one per question.
    #[must_use]
    pub fn rows(&self) -> &[Vec<GridCell>] {
        &self.rows
    }

    /// All regions that survived the area filter, in (y, x) order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Number of detected questions.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.rows.len()
    }
}

/// Per-option marking state for one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionMarks {
    /// Whether each option's fill ratio exceeded the mark threshold.
    pub marked: Vec<bool>,
    /// Measured fill ratio per option, in [0, 1].
    pub fill_ratios: Vec<f64>,
}

impl QuestionMarks {
    /// Number of options marked.
    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.marked.iter().filter(|m| **m).count()
    }

    /// Index of the first marked option, if any.
    #[must_use]
    pub fn first_marked(&self) -> Option<usize> {
        self.marked.iter().position(|m| *m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: u32, y: u32) -> Region {
        Region {
            bbox: BoundingBox::new(x, y, 10, 10),
            area: 78.0,
        }
    }

    #[test]
    fn test_from_rows_assigns_indices() {
        let rows = vec![
            vec![region(0, 0), region(20, 0)],
            vec![region(0, 40), region(20, 40), region(40, 40)],
        ];
        let flat: Vec<Region> = rows.iter().flatten().copied().collect();
        let grid = AnswerGrid::from_rows(rows, flat);

        assert_eq!(grid.question_count(), 2);
        assert_eq!(grid.regions().len(), 5);
        let cell = grid.rows()[1][2];
        assert_eq!((cell.row, cell.column), (1, 2));
        assert_eq!(cell.region.bbox.x, 40);
    }

    #[test]
    fn test_question_marks_counts() {
        let marks = QuestionMarks {
            marked: vec![false, true, false, true],
            fill_ratios: vec![0.1, 0.6, 0.0, 0.7],
        };
        assert_eq!(marks.marked_count(), 2);
        assert_eq!(marks.first_marked(), Some(1));
        assert_eq!(QuestionMarks::default().first_marked(), None);
    }
}
