//! Tunable parameters for the recognition pipeline.

use crate::error::OmrError;

/// Configuration shared by every pipeline stage.
///
/// Built once per batch and never mutated afterwards; workers borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct OmrConfig {
    /// Side of the square smoothing kernel in pixels (odd).
    pub blur_kernel_size: u32,
    /// Side of the neighbourhood used for the local mean threshold (odd, >= 3).
    pub threshold_block_size: u32,
    /// Bias subtracted from the local mean before thresholding.
    pub threshold_c: f32,
    /// Smallest region area (px²) kept as a bubble candidate.
    pub min_contour_area: f64,
    /// Largest region area (px²) kept as a bubble candidate.
    pub max_bubble_area: f64,
    /// Minimum number of questions expected on a sheet.
    pub min_questions: usize,
    /// Minimum number of options per question.
    pub min_options: usize,
    /// Maximum vertical distance (px) between consecutive regions of one row.
    pub row_tolerance: u32,
    /// Fill ratio above which a bubble counts as marked, in (0, 1).
    pub mark_threshold: f64,
    /// Partial-credit flag. Carried through for callers; scoring does not read it.
    pub partial_credit: bool,
    /// Apply the answer key's question weights when computing the score.
    pub weighted_scoring: bool,
}

impl Default for OmrConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            threshold_block_size: 11,
            threshold_c: 2.0,
            min_contour_area: 30.0,
            max_bubble_area: 2000.0,
            min_questions: 10,
            min_options: 4,
            row_tolerance: 20,
            mark_threshold: 0.3,
            partial_credit: false,
            weighted_scoring: false,
        }
    }
}

impl OmrConfig {
    /// Minimum number of regions a sheet must yield to be gradable.
    #[must_use]
    pub const fn min_regions(&self) -> usize {
        self.min_questions * self.min_options
    }

    /// Checks that every parameter is within its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), OmrError> {
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(invalid(format!(
                "blur_kernel_size must be a positive odd number, got {}",
                self.blur_kernel_size
            )));
        }
        if self.threshold_block_size < 3 || self.threshold_block_size % 2 == 0 {
            return Err(invalid(format!(
                "threshold_block_size must be an odd number >= 3, got {}",
                self.threshold_block_size
            )));
        }
        if !self.threshold_c.is_finite() {
            return Err(invalid("threshold_c must be finite".to_string()));
        }
        if !(self.min_contour_area.is_finite() && self.min_contour_area > 0.0) {
            return Err(invalid(format!(
                "min_contour_area must be positive, got {}",
                self.min_contour_area
            )));
        }
        if !(self.max_bubble_area.is_finite() && self.max_bubble_area >= self.min_contour_area) {
            return Err(invalid(format!(
                "max_bubble_area ({}) must be >= min_contour_area ({})",
                self.max_bubble_area, self.min_contour_area
            )));
        }
        if self.min_questions == 0 {
            return Err(invalid("min_questions must be positive".to_string()));
        }
        if self.min_options == 0 {
            return Err(invalid("min_options must be positive".to_string()));
        }
        if !(self.mark_threshold > 0.0 && self.mark_threshold < 1.0) {
            return Err(invalid(format!(
                "mark_threshold must be in (0, 1), got {}",
                self.mark_threshold
            )));
        }
        Ok(())
    }

    /// Gaussian sigma equivalent to the configured kernel size.
    ///
    /// Uses the same kernel-to-sigma rule as the common adaptive-threshold
    /// tooling so that a kernel of 5 smooths with sigma 1.1.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn blur_sigma(&self) -> f32 {
        let k = self.blur_kernel_size as f32;
        0.3f32.mul_add((k - 1.0).mul_add(0.5, -1.0), 0.8)
    }
}

fn invalid(message: String) -> OmrError {
    OmrError::InvalidConfig(message)
}
