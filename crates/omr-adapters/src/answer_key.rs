//! Answer-key document loading.
//!
//! The key is a JSON object:
//!
//! ```json
//! {
//!   "answers": ["A", "C", "B"],
//!   "question_weights": [1.0, 2.0, 1.0],
//!   "exam_info": { "title": "Midterm", "total_questions": 3 }
//! }
//! ```
//!
//! Only `answers` is required.

use std::path::Path;

use omr_core::{AnswerKey, ExamInfo, OmrError};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct AnswerKeyDocument {
    answers: Vec<String>,
    #[serde(default)]
    question_weights: Option<Vec<f64>>,
    #[serde(default)]
    exam_info: Option<ExamInfo>,
}

/// Reads and validates the answer key at `path`.
///
/// # Errors
///
/// Returns [`OmrError::AnswerKey`] if the file cannot be read, is not a valid
/// key document, or contains invalid answers or weights.
pub fn load_answer_key(path: &Path) -> Result<AnswerKey, OmrError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| OmrError::AnswerKey(format!("cannot read {}: {e}", path.display())))?;
    let key = parse_answer_key(&text).map_err(|e| prefix_path(e, path))?;

    info!(
        path = %path.display(),
        questions = key.len(),
        weighted = key.weights().is_some(),
        "loaded answer key"
    );
    if let Some(title) = key.exam_info().and_then(|e| e.title.as_deref()) {
        info!(title, "exam");
    }
    Ok(key)
}

/// Parses an answer-key JSON document.
///
/// # Errors
///
/// Returns [`OmrError::AnswerKey`] for malformed JSON, a missing `answers`
/// field, or invalid answers or weights.
pub fn parse_answer_key(text: &str) -> Result<AnswerKey, OmrError> {
    let doc: AnswerKeyDocument = serde_json::from_str(text)
        .map_err(|e| OmrError::AnswerKey(format!("malformed key document: {e}")))?;

    let key = AnswerKey::new(&doc.answers, doc.question_weights)?;

    let Some(exam) = doc.exam_info else {
        return Ok(key);
    };
    if let Some(declared) = exam.total_questions {
        if declared != key.len() {
            warn!(
                declared,
                actual = key.len(),
                "exam_info.total_questions disagrees with the answer count"
            );
        }
    }
    Ok(key.with_exam_info(exam))
}

fn prefix_path(error: OmrError, path: &Path) -> OmrError {
    match error {
        OmrError::AnswerKey(msg) => OmrError::AnswerKey(format!("{}: {msg}", path.display())),
        other => other,
    }
}
