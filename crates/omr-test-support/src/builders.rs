//! Synthetic answer-sheet builders for testing.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use omr_core::config::OmrConfig;
use omr_core::domain::SheetImage;

/// Bubble radius in pixels.
pub const BUBBLE_RADIUS: i32 = 20;
/// Distance between neighbouring bubble centres, both axes.
pub const BUBBLE_PITCH: i32 = 60;
/// Distance from the image edge to the first bubble centre.
pub const MARGIN: i32 = 60;

const PAPER: Luma<u8> = Luma([255]);
const INK: Luma<u8> = Luma([0]);

/// Builder for printed bubble sheets with pencil marks.
///
/// Unmarked options are drawn as thin outlined circles, marked options as
/// solid discs. Rows are laid out top to bottom, options left to right.
#[derive(Debug, Clone)]
pub struct SyntheticSheetBuilder {
    name: String,
    questions: usize,
    options: usize,
    marks: Vec<Vec<usize>>,
}

impl SyntheticSheetBuilder {
    /// Creates an unmarked sheet with the given layout.
    #[must_use]
    pub fn new(questions: usize, options: usize) -> Self {
        Self {
            name: "synthetic://sheet.png".to_string(),
            questions,
            options,
            marks: vec![Vec::new(); questions],
        }
    }

    /// Ten questions with options A-D, the smallest layout the default
    /// configuration accepts.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(10, 4)
    }

    /// Sets the sheet name (the student id is derived from its file stem).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks option `option` (0 = 'A') of question `question`.
    ///
    /// Out-of-range positions are ignored.
    #[must_use]
    pub fn mark(mut self, question: usize, option: usize) -> Self {
        if option < self.options {
            if let Some(row) = self.marks.get_mut(question) {
                if !row.contains(&option) {
                    row.push(option);
                }
            }
        }
        self
    }

    /// Marks one letter per question; `.` or space leaves a question blank.
    #[must_use]
    pub fn answers(mut self, letters: &str) -> Self {
        for (question, letter) in letters.chars().enumerate() {
            if letter.is_ascii_alphabetic() {
                let option = (letter.to_ascii_uppercase() as usize) - ('A' as usize);
                self = self.mark(question, option);
            }
        }
        self
    }

    /// Configuration tuned for the sheets this builder draws.
    ///
    /// Uses a neighbourhood wider than a bubble so solid discs stay solid
    /// after thresholding.
    #[must_use]
    pub fn recommended_config() -> OmrConfig {
        OmrConfig {
            threshold_block_size: 61,
            threshold_c: 30.0,
            mark_threshold: 0.5,
            ..OmrConfig::default()
        }
    }

    /// Centre of a bubble in image coordinates.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn bubble_center(question: usize, option: usize) -> (i32, i32) {
        (
            MARGIN + option as i32 * BUBBLE_PITCH,
            MARGIN + question as i32 * BUBBLE_PITCH,
        )
    }

    /// Renders the sheet as a grayscale image.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn build_image(&self) -> GrayImage {
        let span = |n: usize| -> u32 {
            let n = n.max(1) as u32;
            2 * MARGIN as u32 + (n - 1) * BUBBLE_PITCH as u32
        };
        let mut img = GrayImage::from_pixel(span(self.options), span(self.questions), PAPER);

        for (question, marked) in self.marks.iter().enumerate() {
            for option in 0..self.options {
                let center = Self::bubble_center(question, option);
                if marked.contains(&option) {
                    draw_filled_circle_mut(&mut img, center, BUBBLE_RADIUS, INK);
                } else {
                    draw_hollow_circle_mut(&mut img, center, BUBBLE_RADIUS, INK);
                    draw_hollow_circle_mut(&mut img, center, BUBBLE_RADIUS - 1, INK);
                }
            }
        }
        img
    }

    /// Renders the sheet wrapped as a pipeline input.
    #[must_use]
    pub fn build(&self) -> SheetImage {
        SheetImage::new(self.name.clone(), DynamicImage::ImageLuma8(self.build_image()))
    }

    /// Renders the sheet and writes it to `path` (format from the extension).
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded or written.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        self.build_image().save(path.as_ref())?;
        Ok(())
    }

    /// A page with no printing at all.
    #[must_use]
    pub fn blank_page(width: u32, height: u32) -> SheetImage {
        SheetImage::new(
            "synthetic://blank.png",
            DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, PAPER)),
        )
    }
}
