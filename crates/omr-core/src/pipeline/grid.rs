//! Answer-grid discovery.
//!
//! Extracts outer contours from the binary mask, keeps the ones whose area
//! fits the bubble band, then clusters them into question rows by vertical
//! position and orders each row left to right.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use tracing::debug;

use crate::config::OmrConfig;
use crate::domain::{AnswerGrid, BoundingBox, Region};
use crate::error::OmrError;

/// Locates bubbles in a binary mask and arranges them into a grid.
#[derive(Debug, Clone)]
pub struct GridDetector {
    min_area: f64,
    max_area: f64,
    min_regions: usize,
    row_tolerance: u32,
}

impl GridDetector {
    /// Creates a detector from the pipeline configuration.
    #[must_use]
    pub const fn new(config: &OmrConfig) -> Self {
        Self {
            min_area: config.min_contour_area,
            max_area: config.max_bubble_area,
            min_regions: config.min_regions(),
            row_tolerance: config.row_tolerance,
        }
    }

    /// Builds the answer grid for `mask`.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::InsufficientRegions`] when fewer than
    /// `min_questions * min_options` regions survive the area filter.
    pub fn run(&self, mask: &GrayImage) -> Result<AnswerGrid, OmrError> {
        let candidates = extract_regions(mask);
        let total = candidates.len();

        let mut accepted: Vec<Region> = candidates
            .into_iter()
            .filter(|r| self.accepts(r))
            .collect();
        debug!(
            candidates = total,
            accepted = accepted.len(),
            "filtered regions by area"
        );

        if accepted.len() < self.min_regions {
            return Err(OmrError::InsufficientRegions {
                found: accepted.len(),
                required: self.min_regions,
            });
        }

        accepted.sort_by_key(|r| (r.bbox.y, r.bbox.x));
        let rows = cluster_rows(&accepted, self.row_tolerance);
        debug!(rows = rows.len(), "clustered regions into rows");

        Ok(AnswerGrid::from_rows(rows, accepted))
    }

    fn accepts(&self, region: &Region) -> bool {
        (self.min_area..=self.max_area).contains(&region.area)
    }
}

/// Extracts every outermost connected foreground component of `mask`.
///
/// Holes and components nested inside holes are not reported.
#[must_use]
pub fn extract_regions(mask: &GrayImage) -> Vec<Region> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let bbox = bounding_box(&c.points)?;
            Some(Region {
                bbox,
                area: polygon_area(&c.points),
            })
        })
        .collect()
}

/// Groups regions (sorted by `(y, x)`) into rows.
///
/// A region opens a new row when its `y` differs from the previous region's
/// `y` by more than `tolerance`. Each row is then ordered by `x`.
#[must_use]
pub fn cluster_rows(sorted: &[Region], tolerance: u32) -> Vec<Vec<Region>> {
    let mut rows: Vec<Vec<Region>> = Vec::new();
    let mut last_y: Option<u32> = None;

    for region in sorted {
        let opens_row = last_y.map_or(true, |prev| region.bbox.y.abs_diff(prev) > tolerance);
        if opens_row {
            rows.push(Vec::new());
        }
        if let Some(row) = rows.last_mut() {
            row.push(*region);
        }
        last_y = Some(region.bbox.y);
    }

    for row in &mut rows {
        row.sort_by_key(|r| r.bbox.x);
    }
    rows
}

fn bounding_box(points: &[Point<i32>]) -> Option<BoundingBox> {
    let min_x = points.iter().map(|p| p.x).min()?;
    let max_x = points.iter().map(|p| p.x).max()?;
    let min_y = points.iter().map(|p| p.y).min()?;
    let max_y = points.iter().map(|p| p.y).max()?;

    Some(BoundingBox::new(
        u32::try_from(min_x).ok()?,
        u32::try_from(min_y).ok()?,
        u32::try_from(max_x - min_x + 1).ok()?,
        u32::try_from(max_y - min_y + 1).ok()?,
    ))
}

/// Shoelace area of the closed polygon through `points`.
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let area = twice.unsigned_abs() as f64 / 2.0;
    area
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::preprocess::FOREGROUND;
    use image::Luma;

    fn fill_rect(mask: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                mask.put_pixel(xx, yy, Luma([FOREGROUND]));
            }
        }
    }

    fn region_at(x: u32, y: u32) -> Region {
        Region {
            bbox: BoundingBox::new(x, y, 10, 10),
            area: 81.0,
        }
    }

    fn small_config() -> OmrConfig {
        OmrConfig {
            min_questions: 3,
            min_options: 4,
            ..OmrConfig::default()
        }
    }

    /// 3 rows x 4 columns of 10x10 squares, 30 px apart.
    fn grid_mask() -> GrayImage {
        let mut mask = GrayImage::new(160, 120);
        for row in 0..3 {
            for col in 0..4 {
                fill_rect(&mut mask, 10 + col * 30, 10 + row * 30, 10, 10);
            }
        }
        mask
    }

    #[test]
    fn test_polygon_area_square() {
        let pts = [
            Point::new(0, 0),
            Point::new(9, 0),
            Point::new(9, 9),
            Point::new(0, 9),
        ];
        assert!((polygon_area(&pts) - 81.0).abs() < f64::EPSILON);
        assert!(polygon_area(&pts[..2]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_extract_regions_square() {
        let mut mask = GrayImage::new(40, 40);
        fill_rect(&mut mask, 5, 7, 10, 10);
        let regions = extract_regions(&mask);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bbox, BoundingBox::new(5, 7, 10, 10));
        assert!((regions[0].area - 81.0).abs() < 1e-9);
    }

    #[test]
    fn test_extract_regions_ignores_holes() {
        let mut mask = GrayImage::new(40, 40);
        fill_rect(&mut mask, 5, 5, 20, 20);
        // Punch a hole, then put an island inside it.
        for y in 9..21 {
            for x in 9..21 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        fill_rect(&mut mask, 13, 13, 4, 4);

        let regions = extract_regions(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bbox, BoundingBox::new(5, 5, 20, 20));
    }

    #[test]
    fn test_detects_grid_rows_and_columns() {
        let detector = GridDetector::new(&small_config());
        let grid = detector.run(&grid_mask()).unwrap();

        assert_eq!(grid.question_count(), 3);
        assert_eq!(grid.regions().len(), 12);
        for (r, row) in grid.rows().iter().enumerate() {
            assert_eq!(row.len(), 4);
            let xs: Vec<u32> = row.iter().map(|c| c.region.bbox.x).collect();
            assert_eq!(xs, [10, 40, 70, 100]);
            assert!(row.iter().all(|c| c.row == r));
        }
        let ys: Vec<u32> = grid.rows().iter().map(|r| r[0].region.bbox.y).collect();
        assert_eq!(ys, [10, 40, 70]);
    }

    #[test]
    fn test_area_band_discards_noise_and_blobs() {
        let mut mask = grid_mask();
        fill_rect(&mut mask, 150, 2, 2, 2); // speck, area 1
        let detector = GridDetector::new(&small_config());
        let grid = detector.run(&mask).unwrap();
        assert_eq!(grid.regions().len(), 12);

        let mut big = GrayImage::new(300, 300);
        fill_rect(&mut big, 0, 0, 200, 200);
        let err = detector.run(&big).unwrap_err();
        assert_eq!(
            err,
            OmrError::InsufficientRegions {
                found: 0,
                required: 12
            }
        );
    }

    #[test]
    fn test_insufficient_regions() {
        let mut mask = GrayImage::new(160, 120);
        for col in 0..4 {
            fill_rect(&mut mask, 10 + col * 30, 10, 10, 10);
        }
        let detector = GridDetector::new(&small_config());
        let err = detector.run(&mask).unwrap_err();
        assert_eq!(
            err,
            OmrError::InsufficientRegions {
                found: 4,
                required: 12
            }
        );
    }

    #[test]
    fn test_short_row_is_kept() {
        let mut mask = grid_mask();
        fill_rect(&mut mask, 10, 100, 10, 10);
        let detector = GridDetector::new(&small_config());
        let grid = detector.run(&mask).unwrap();
        assert_eq!(grid.question_count(), 4);
        assert_eq!(grid.rows()[3].len(), 1);
    }

    #[test]
    fn test_row_tolerance_boundary() {
        let tol = 20;
        let same = cluster_rows(&[region_at(0, 100), region_at(30, 100 + tol)], tol);
        assert_eq!(same.len(), 1);

        let split = cluster_rows(&[region_at(0, 100), region_at(30, 100 + tol + 1)], tol);
        assert_eq!(split.len(), 2);
    }

    #[test]
    fn test_rows_sorted_by_x() {
        // Slight skew: the rightmost bubble sits a few pixels higher.
        let mut sorted = vec![region_at(60, 95), region_at(0, 100), region_at(30, 102)];
        sorted.sort_by_key(|r| (r.bbox.y, r.bbox.x));
        let rows = cluster_rows(&sorted, 20);
        assert_eq!(rows.len(), 1);
        let xs: Vec<u32> = rows[0].iter().map(|r| r.bbox.x).collect();
        assert_eq!(xs, [0, 30, 60]);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let detector = GridDetector::new(&small_config());
        let mask = grid_mask();
        assert_eq!(detector.run(&mask).unwrap(), detector.run(&mask).unwrap());
    }
}
