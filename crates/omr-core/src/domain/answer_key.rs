//! Answer key: the expected option per question.

use serde::{Deserialize, Serialize};

use crate::error::OmrError;

/// Descriptive exam metadata that may accompany an answer key.
///
/// Informational only; grading never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamInfo {
    /// Exam title.
    pub title: Option<String>,
    /// Exam date as written in the key document.
    pub date: Option<String>,
    /// Declared number of questions.
    pub total_questions: Option<usize>,
    /// Declared number of options per question.
    pub options_per_question: Option<usize>,
}

/// Ordered expected answers, one option letter per question.
///
/// The key length is the canonical question count for scoring. Letters are
/// stored upper-cased and compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerKey {
    answers: Vec<char>,
    weights: Option<Vec<f64>>,
    exam: Option<ExamInfo>,
}

impl AnswerKey {
    /// Builds a key from single-letter strings and optional per-question weights.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::AnswerKey`] if an entry is not a single letter, or if
    /// the weights do not match the answers one-to-one with positive values.
    pub fn new<S: AsRef<str>>(answers: &[S], weights: Option<Vec<f64>>) -> Result<Self, OmrError> {
        let answers = answers
            .iter()
            .enumerate()
            .map(|(i, raw)| parse_letter(i, raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(ref w) = weights {
            if w.len() != answers.len() {
                return Err(OmrError::AnswerKey(format!(
                    "question_weights has {} entries but answers has {}",
                    w.len(),
                    answers.len()
                )));
            }
            if let Some((i, bad)) = w
                .iter()
                .enumerate()
                .find(|(_, v)| !(v.is_finite() && **v > 0.0))
            {
                return Err(OmrError::AnswerKey(format!(
                    "question_weights[{i}] must be positive, got {bad}"
                )));
            }
        }

        Ok(Self {
            answers,
            weights,
            exam: None,
        })
    }

    /// Attaches exam metadata.
    #[must_use]
    pub fn with_exam_info(mut self, exam: ExamInfo) -> Self {
        self.exam = Some(exam);
        self
    }

    /// Number of questions in the key.
    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// True when the key has no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Expected letters in question order.
    #[must_use]
    pub fn answers(&self) -> &[char] {
        &self.answers
    }

    /// Per-question weights, if the key declared any.
    #[must_use]
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Exam metadata, if the key declared any.
    #[must_use]
    pub fn exam_info(&self) -> Option<&ExamInfo> {
        self.exam.as_ref()
    }

    /// Case-insensitive check of `letter` against question `index`.
    #[must_use]
    pub fn is_correct(&self, index: usize, letter: char) -> bool {
        self.answers
            .get(index)
            .is_some_and(|expected| expected.eq_ignore_ascii_case(&letter))
    }
}

fn parse_letter(index: usize, raw: &str) -> Result<char, OmrError> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_uppercase()),
        _ => Err(OmrError::AnswerKey(format!(
            "answers[{index}] must be a single letter, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_are_normalized() {
        let key = AnswerKey::new(&["a", "B", " c "], None).unwrap();
        assert_eq!(key.answers(), &['A', 'B', 'C']);
        assert_eq!(key.len(), 3);
    }

    #[test]
    fn test_comparison_is_case_insensitive() {
        let key = AnswerKey::new(&["A", "d"], None).unwrap();
        assert!(key.is_correct(0, 'a'));
        assert!(key.is_correct(1, 'D'));
        assert!(!key.is_correct(1, 'C'));
        assert!(!key.is_correct(5, 'A'));
    }

    #[test]
    fn test_multi_letter_entry_rejected() {
        let err = AnswerKey::new(&["A", "AB"], None).unwrap_err();
        assert!(matches!(err, OmrError::AnswerKey(_)));
        assert!(err.to_string().contains("answers[1]"));
    }

    #[test]
    fn test_blank_and_digit_entries_rejected() {
        assert!(AnswerKey::new(&[""], None).is_err());
        assert!(AnswerKey::new(&["1"], None).is_err());
    }

    #[test]
    fn test_empty_key_allowed() {
        let key = AnswerKey::new::<&str>(&[], None).unwrap();
        assert!(key.is_empty());
    }

    #[test]
    fn test_weight_length_mismatch_rejected() {
        let err = AnswerKey::new(&["A", "B"], Some(vec![1.0])).unwrap_err();
        assert!(err.to_string().contains("question_weights"));
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let err = AnswerKey::new(&["A", "B"], Some(vec![1.0, 0.0])).unwrap_err();
        assert!(err.to_string().contains("question_weights[1]"));
    }

    #[test]
    fn test_exam_info_attached() {
        let key = AnswerKey::new(&["A"], Some(vec![2.0]))
            .unwrap()
            .with_exam_info(ExamInfo {
                title: Some("Midterm".into()),
                ..ExamInfo::default()
            });
        assert_eq!(key.weights(), Some(&[2.0][..]));
        assert_eq!(
            key.exam_info().and_then(|e| e.title.as_deref()),
            Some("Midterm")
        );
    }
}
