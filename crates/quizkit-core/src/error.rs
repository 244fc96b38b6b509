//! Engine error taxonomy.
//!
//! Every rejected operation surfaces one of these at the call boundary and
//! leaves the attempt state untouched, so a quiz remains resumable after any
//! single failure. Only `InvalidQuiz` can occur at construction time.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors produced by the quiz engine.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Operation attempted in the wrong lifecycle phase.
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Question id not present in the current set or any loaded page.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// Submitted value's type tag disagrees with the question's expectation.
    #[error("answer type mismatch for question {question_id}: expected {expected}, got {got}")]
    AnswerTypeMismatch {
        question_id: String,
        expected: ValueKind,
        got: ValueKind,
    },

    /// Navigation past either end of the question sequence.
    #[error("navigation out of bounds: {0}")]
    NavigationBoundary(String),

    /// A paged fetch failed or returned malformed data.
    #[error("question loader failed: {0}")]
    LoaderFailure(String),

    /// Composite question nesting exceeds the configured depth limit.
    #[error("composite question nesting exceeds depth limit of {0}")]
    RecursionLimitExceeded(usize),

    /// The question source's ordering is authoritative and cannot be
    /// permuted client-side.
    #[error("shuffle not supported: {0}")]
    ShuffleUnsupported(String),

    /// Structurally corrupt quiz or attempt construction.
    #[error("invalid quiz: {0}")]
    InvalidQuiz(String),
}
