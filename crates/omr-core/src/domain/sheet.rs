//! Per-sheet input and result types.

use std::fmt;
use std::path::Path;

use image::GenericImageView;
use serde::{Deserialize, Serialize};

/// Serialized form of [`Answer::Multiple`].
pub const MULTIPLE_SENTINEL: &str = "MULTIPLE";

/// Options per question that can be named with a letter ('A'..='Z').
pub const MAX_OPTIONS: usize = 26;

/// Student id recorded for sheets that failed to process.
pub const UNKNOWN_STUDENT: &str = "UNKNOWN";

/// A decoded answer-sheet image ready for the pipeline.
#[derive(Debug, Clone)]
pub struct SheetImage {
    /// Name of the input, usually its file path.
    pub name: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: image::DynamicImage,
}

impl SheetImage {
    /// Wraps a decoded image under the given input name.
    #[must_use]
    pub fn new(name: impl Into<String>, image: image::DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            name: name.into(),
            width,
            height,
            image,
        }
    }

    /// Student identifier derived from the input name (its file stem).
    #[must_use]
    pub fn student_id(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// The detected response to a single question.
///
/// Serializes as the option letter, an empty string for [`Answer::Blank`], or
/// [`MULTIPLE_SENTINEL`] for [`Answer::Multiple`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Answer {
    /// No option was marked.
    Blank,
    /// Exactly one option was marked.
    Choice(char),
    /// More than one option was marked.
    Multiple,
}

impl Answer {
    /// The answer for option `index` (0 = 'A'), or `None` past 'Z'.
    #[must_use]
    pub fn from_option_index(index: usize) -> Option<Self> {
        if index >= MAX_OPTIONS {
            return None;
        }
        let offset = u8::try_from(index).ok()?;
        Some(Self::Choice(char::from(b'A' + offset)))
    }

    /// True for [`Answer::Blank`].
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => Ok(()),
            Self::Choice(c) => write!(f, "{c}"),
            Self::Multiple => f.write_str(MULTIPLE_SENTINEL),
        }
    }
}

impl From<Answer> for String {
    fn from(answer: Answer) -> Self {
        answer.to_string()
    }
}

impl TryFrom<String> for Answer {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}

impl std::str::FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::Blank);
        }
        if s == MULTIPLE_SENTINEL {
            return Ok(Self::Multiple);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Self::Choice(c)),
            _ => Err(format!("not an answer: {s:?}")),
        }
    }
}

/// Grading outcome for one answer sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSheetResult {
    /// Student identifier, or [`UNKNOWN_STUDENT`] when processing failed.
    pub student_id: String,
    /// Detected answer per question, top to bottom.
    pub answers: Vec<Answer>,
    /// Detector confidence per question, in [0, 1].
    pub confidence_scores: Vec<f64>,
    /// Number of questions in the answer key used for grading.
    pub total_questions: usize,
    /// Answers matching the key.
    pub correct_answers: usize,
    /// Answers not matching the key, including multiple marks.
    pub incorrect_answers: usize,
    /// Unanswered questions.
    pub blank_answers: usize,
    /// Score in [0, 100], rounded to two decimals.
    pub score: f64,
    /// Processing errors, empty on success.
    pub processing_errors: Vec<String>,
}

impl AnswerSheetResult {
    /// Result for a sheet that could not be processed.
    #[must_use]
    pub fn failed(total_questions: usize, message: impl Into<String>) -> Self {
        Self {
            student_id: UNKNOWN_STUDENT.to_string(),
            answers: Vec::new(),
            confidence_scores: Vec::new(),
            total_questions,
            correct_answers: 0,
            incorrect_answers: 0,
            blank_answers: 0,
            score: 0.0,
            processing_errors: vec![message.into()],
        }
    }

    /// True when no processing error was recorded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.processing_errors.is_empty()
    }

    /// Mean of the per-question confidences, `None` when there are none.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_confidence(&self) -> Option<f64> {
        if self.confidence_scores.is_empty() {
            return None;
        }
        Some(self.confidence_scores.iter().sum::<f64>() / self.confidence_scores.len() as f64)
    }
}
