//! Collaborator seams for the quiz engine.
//!
//! The paged [`QuestionLoader`] is implemented by the `quizkit-loaders`
//! crate; [`AnswerValidator`] is the per-question override hook a content
//! source can attach to any question.

use async_trait::async_trait;

use crate::model::Question;
use crate::results::Validation;
use crate::value::AnswerValue;

/// Custom validation strategy attached to a single question.
///
/// When present on a question it replaces the default per-type validator
/// for that question exclusively. Implementations must be pure with respect
/// to attempt state: they see only the submitted and expected values.
pub trait AnswerValidator: Send + Sync {
    /// Score a submission. `correct` is `None` for questions without a
    /// stored expected answer (non-evaluated types).
    fn validate(&self, user: &AnswerValue, correct: Option<&AnswerValue>) -> Validation;
}

/// Paged, asynchronous supplier of question batches for large quizzes.
///
/// The engine requests windows around its cursor and never assumes the full
/// set fits in memory. `total_questions` is an upper bound fixed for the
/// life of an attempt; a loader may return a short final page. Fetch
/// failures surface from the navigation operation that triggered them; the
/// engine does not retry, so any retry policy belongs to the implementation.
#[async_trait]
pub trait QuestionLoader: Send + Sync {
    /// Total number of questions this source can serve.
    fn total_questions(&self) -> usize;

    /// Load up to `count` questions starting at `start_index`.
    async fn load_questions(&self, start_index: usize, count: usize)
        -> anyhow::Result<Vec<Question>>;
}

/// Validator that scores by applying a caller-supplied closure.
///
/// The simplest way to attach one-off scoring logic to a question without
/// a dedicated type.
pub struct FnValidator<F>(pub F);

impl<F> AnswerValidator for FnValidator<F>
where
    F: Fn(&AnswerValue, Option<&AnswerValue>) -> Validation + Send + Sync,
{
    fn validate(&self, user: &AnswerValue, correct: Option<&AnswerValue>) -> Validation {
        (self.0)(user, correct)
    }
}
