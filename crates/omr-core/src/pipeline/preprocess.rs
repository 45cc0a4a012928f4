//! Image normalization: raw sheet image to binary ink mask.
//!
//! Grayscale conversion, Gaussian smoothing, then a local-mean adaptive
//! threshold so that uneven lighting across a scan does not bias detection.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::{box_filter, separable_filter_equal};
use tracing::trace;

use crate::config::OmrConfig;
use crate::error::OmrError;

/// Mask value for ink pixels.
pub const FOREGROUND: u8 = 255;
/// Mask value for paper pixels.
pub const BACKGROUND: u8 = 0;

/// Converts sheet images into binary masks (ink = [`FOREGROUND`]).
#[derive(Debug, Clone)]
pub struct Preprocessor {
    blur_kernel: Vec<f32>,
    block_radius: u32,
    bias: f32,
}

impl Preprocessor {
    /// Creates a preprocessor from the pipeline configuration.
    #[must_use]
    pub fn new(config: &OmrConfig) -> Self {
        Self {
            blur_kernel: gaussian_kernel(config.blur_kernel_size, config.blur_sigma()),
            block_radius: config.threshold_block_size / 2,
            bias: config.threshold_c,
        }
    }

    /// Produces the binary mask for `image`.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::InvalidImage`] if the image has zero area.
    pub fn run(&self, image: &DynamicImage) -> Result<GrayImage, OmrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OmrError::InvalidImage(format!(
                "image has zero area ({}x{})",
                image.width(),
                image.height()
            )));
        }

        let gray = image.to_luma8();
        let smoothed = self.smooth(gray);
        let mask = self.adaptive_threshold(&smoothed);
        trace!(
            width = mask.width(),
            height = mask.height(),
            "binarized sheet"
        );
        Ok(mask)
    }

    /// Gaussian smoothing with exactly `blur_kernel_size` taps per axis.
    fn smooth(&self, gray: GrayImage) -> GrayImage {
        if self.blur_kernel.len() > 1 {
            separable_filter_equal(&gray, &self.blur_kernel)
        } else {
            gray
        }
    }

    /// Inverted local-mean threshold: a pixel is ink when it is at least
    /// `bias` darker than the mean of its `block x block` neighbourhood.
    fn adaptive_threshold(&self, image: &GrayImage) -> GrayImage {
        let local_mean = box_filter(image, self.block_radius, self.block_radius);
        GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let value = f32::from(image.get_pixel(x, y).0[0]);
            let threshold = f32::from(local_mean.get_pixel(x, y).0[0]) - self.bias;
            if value <= threshold {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        })
    }
}

/// Normalized 1-D Gaussian of `size` taps centred on the middle tap.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let radius = (size / 2) as f32;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f32> = (0..size.max(1))
        .map(|i| {
            let d = i as f32 - radius;
            (-(d * d) / denom).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}
