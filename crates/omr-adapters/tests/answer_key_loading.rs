//! Integration tests for answer-key documents on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use omr_adapters::load_answer_key;
use omr_core::OmrError;
use tempfile::TempDir;

#[test]
fn test_load_key_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("key.json");
    fs::write(
        &path,
        r#"{
            "answers": ["A", "B", "C", "D"],
            "exam_info": {"title": "Unit 4", "options_per_question": 4}
        }"#,
    )
    .unwrap();

    let key = load_answer_key(&path).expect("key should load");
    assert_eq!(key.len(), 4);
    assert!(key.is_correct(2, 'c'));
    assert_eq!(key.exam_info().unwrap().options_per_question, Some(4));
}

#[test]
fn test_missing_key_file() {
    let dir = TempDir::new().unwrap();
    let err = load_answer_key(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, OmrError::AnswerKey(msg) if msg.contains("nope.json")));
}

#[test]
fn test_invalid_key_mentions_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"answers": ["A", 7]}"#).unwrap();

    let err = load_answer_key(&path).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("answer key error: "));
    assert!(msg.contains("bad.json"));
}

#[test]
fn test_non_positive_weight_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("weights.json");
    fs::write(
        &path,
        r#"{"answers": ["A", "B"], "question_weights": [1.0, 0.0]}"#,
    )
    .unwrap();

    assert!(matches!(
        load_answer_key(&path),
        Err(OmrError::AnswerKey(_))
    ));
}
