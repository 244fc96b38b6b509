//! Mutable attempt state.
//!
//! A [`QuizState`] is owned and mutated exclusively by one
//! [`crate::engine::QuizEngine`]; everything here is a passive, serializable
//! record of where an attempt stands.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::results::Answer;

/// Lifecycle phase of an attempt. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    NotStarted,
    InProgress,
    Paused,
    Completed,
}

/// Wall-clock stopwatch counting only active (unpaused) time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stopwatch {
    accumulated_secs: f64,
    running_since: Option<DateTime<Utc>>,
}

impl Stopwatch {
    pub fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Utc::now());
        }
    }

    /// Freeze accounting; elapsed time stops growing until `start`.
    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            let delta = Utc::now().signed_duration_since(since);
            self.accumulated_secs += delta.num_milliseconds() as f64 / 1000.0;
        }
    }

    /// Active seconds so far.
    pub fn elapsed_secs(&self) -> f64 {
        let running = self
            .running_since
            .map(|since| Utc::now().signed_duration_since(since).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);
        self.accumulated_secs + running
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }
}

/// Append-only submission history with a latest-per-question view.
///
/// Resubmitting a question appends a new [`Answer`] record; the earlier one
/// is kept for audit/undo. The latest view iterates with unique question
/// ids in first-submission order, matching an insertion-ordered map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerLog {
    history: Vec<Answer>,
}

impl AnswerLog {
    pub fn record(&mut self, answer: Answer) {
        self.history.push(answer);
    }

    /// Full append-only history, oldest first.
    pub fn history(&self) -> &[Answer] {
        &self.history
    }

    /// The most recent answer for a question, if any.
    pub fn latest(&self, question_id: &str) -> Option<&Answer> {
        self.history
            .iter()
            .rev()
            .find(|a| a.question_id == question_id)
    }

    pub fn has_answer(&self, question_id: &str) -> bool {
        self.latest(question_id).is_some()
    }

    /// Latest answer per question, keys in first-submission order.
    pub fn latest_answers(&self) -> Vec<&Answer> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for answer in &self.history {
            if seen.insert(answer.question_id.as_str()) {
                order.push(answer.question_id.as_str());
            }
        }
        order
            .into_iter()
            .filter_map(|id| self.latest(id))
            .collect()
    }

    /// Number of distinct questions answered.
    pub fn answered_count(&self) -> usize {
        self.history
            .iter()
            .map(|a| a.question_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Attempt-level metadata supplied at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptMetadata {
    pub quiz_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub total_points_possible: f64,
}

/// The complete mutable state of one quiz attempt.
///
/// Frozen (no further mutation) once `phase` is `Completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizState {
    pub attempt_id: Uuid,
    pub phase: QuizPhase,
    pub current_index: usize,
    /// Running total of awarded points.
    pub score: f64,
    pub answers: AnswerLog,
    /// Ids the player explicitly skipped past.
    pub skipped: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub stopwatch: Stopwatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AttemptMetadata>,
}

impl QuizState {
    pub fn new(metadata: Option<AttemptMetadata>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            phase: QuizPhase::NotStarted,
            current_index: 0,
            score: 0.0,
            answers: AnswerLog::default(),
            skipped: Vec::new(),
            started_at: None,
            ended_at: None,
            stopwatch: Stopwatch::default(),
            metadata,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.phase == QuizPhase::Completed
    }
}
