//! Test support utilities for the OMR grader.
//!
//! Provides mocks, synthetic answer-sheet builders, and utilities for testing
//! the grading pipeline.
//!
//! # Example
//!
//! ```
//! use omr_test_support::{MockSheetSource, SyntheticSheetBuilder};
//!
//! // Ten questions, A-D, student answered "ABCD" then left the rest blank
//! let sheet = SyntheticSheetBuilder::standard()
//!     .named("alice.png")
//!     .answers("ABCD")
//!     .build();
//! let blank = SyntheticSheetBuilder::blank_page(200, 200);
//!
//! // Create mock sheet source
//! let source = MockSheetSource::new(vec![sheet, blank]);
//! ```

mod builders;
mod mocks;

pub use builders::{SyntheticSheetBuilder, BUBBLE_PITCH, BUBBLE_RADIUS, MARGIN};
pub use mocks::{MockProgressSink, MockReportOutput, MockSheetSource};
