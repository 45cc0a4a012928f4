//! OMR Adapters - External adapters for the OMR grader.
//!
//! This crate provides adapters for:
//! - Filesystem sheet source
//! - Answer-key JSON documents

pub mod answer_key;
pub mod fs;

pub use answer_key::{load_answer_key, parse_answer_key};
pub use fs::FsSheetSource;
