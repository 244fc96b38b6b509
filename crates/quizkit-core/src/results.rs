//! Submission records and validation outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::AnswerValue;

/// Outcome of validating one answer value.
///
/// `score` is a fraction in `0.0..=1.0`; full credit is `1.0` regardless of
/// the question's point weight. The engine multiplies by the question's
/// weight when updating the running total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub is_correct: bool,
    pub score: f64,
}

impl Validation {
    pub fn correct() -> Self {
        Self {
            is_correct: true,
            score: 1.0,
        }
    }

    pub fn incorrect() -> Self {
        Self {
            is_correct: false,
            score: 0.0,
        }
    }

    /// Partial credit: correct only at (effectively) full score.
    pub fn fraction(score: f64) -> Self {
        let clamped = score.clamp(0.0, 1.0);
        Self {
            is_correct: clamped >= 1.0 - 1e-9,
            score: clamped,
        }
    }
}

/// One recorded submission.
///
/// Created by the engine at submission time; `is_correct` and `awarded`
/// are written by the validator path only, never by the caller. Records are
/// immutable once created: resubmitting appends a new record to the
/// attempt's answer log instead of mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub value: AnswerValue,
    pub is_correct: bool,
    /// Points awarded: validation fraction × question weight.
    pub awarded: f64,
    /// Whether `awarded` counts toward the top-level total. `false` for
    /// non-evaluated recordings and for sub-question answers, which
    /// contribute through their passage's aggregate instead.
    pub scored: bool,
    pub submitted_at: DateTime<Utc>,
    /// Active (unpaused) seconds spent on the question before submitting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_secs: Option<f64>,
}
