//! Attempt report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::QuizEngine;
use crate::state::QuizPhase;

/// A point-in-time summary of one quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The attempt this report describes.
    pub attempt_id: Uuid,
    /// Quiz the attempt ran against, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<String>,
    pub phase: QuizPhase,
    /// Total awarded points at report time.
    pub score: f64,
    /// Maximum attainable score, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points_possible: Option<f64>,
    /// Distinct questions answered.
    pub answered: usize,
    /// Question ids explicitly skipped.
    pub skipped: Vec<String>,
    /// Active (unpaused) seconds spent on the attempt.
    pub duration_secs: f64,
    /// Per-question breakdown.
    pub results: Vec<QuestionResult>,
}

/// One row of the per-question breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub question_type: String,
    pub is_correct: bool,
    pub awarded: f64,
    pub points_possible: f64,
    /// Submission count, resubmissions included.
    pub attempts: usize,
    /// Whether `awarded` counts toward the attempt total. `false` for
    /// sub-question and non-evaluated rows.
    pub counts_toward_total: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_secs: Option<f64>,
}

impl AttemptReport {
    /// Snapshot the current state of an attempt.
    pub fn from_engine(engine: &QuizEngine) -> Self {
        let state = engine.state();
        let mut results = Vec::new();

        for answer in state.answers.latest_answers() {
            let attempts = state
                .answers
                .history()
                .iter()
                .filter(|a| a.question_id == answer.question_id)
                .count();
            let (question_type, points_possible) = engine
                .question(&answer.question_id)
                .map(|q| (q.question_type().to_string(), q.points()))
                .unwrap_or_else(|| ("UNKNOWN".into(), 0.0));
            results.push(QuestionResult {
                question_id: answer.question_id.clone(),
                question_type,
                is_correct: answer.is_correct,
                awarded: answer.awarded,
                points_possible,
                attempts,
                counts_toward_total: answer.scored,
                time_spent_secs: answer.time_spent_secs,
            });
        }

        // Composite questions never appear in the answer log; derive their
        // rows from the sub-answer aggregate.
        for id in engine.composite_ids() {
            let Some(question) = engine.question(id) else { continue };
            let Ok(aggregate) = engine.composite_result(id) else { continue };
            let answered_subs = question
                .sub_questions()
                .iter()
                .filter(|sub| state.answers.has_answer(&sub.id))
                .count();
            if answered_subs == 0 {
                continue;
            }
            results.push(QuestionResult {
                question_id: id.clone(),
                question_type: question.question_type().to_string(),
                is_correct: aggregate.is_correct,
                awarded: aggregate.score * question.points(),
                points_possible: question.points(),
                attempts: answered_subs,
                counts_toward_total: true,
                time_spent_secs: None,
            });
        }

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            attempt_id: state.attempt_id,
            quiz_id: state.metadata.as_ref().map(|m| m.quiz_id.clone()),
            phase: state.phase,
            score: state.score,
            total_points_possible: state.metadata.as_ref().map(|m| m.total_points_possible),
            answered: state.answers.answered_count(),
            skipped: state.skipped.clone(),
            duration_secs: state.stopwatch.elapsed_secs(),
            results,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        let total = self
            .total_points_possible
            .map(|t| format!("{:.1}", t))
            .unwrap_or_else(|| "?".into());
        md.push_str(&format!(
            "**Score:** {:.1} / {} ({} answered, {} skipped)\n\n",
            self.score,
            total,
            self.answered,
            self.skipped.len()
        ));

        if !self.results.is_empty() {
            md.push_str("| Question | Type | Result | Points | Attempts |\n");
            md.push_str("|----------|------|--------|--------|----------|\n");
            for r in &self.results {
                md.push_str(&format!(
                    "| {} | {} | {} | {:.1}/{:.1} | {} |\n",
                    r.question_id,
                    r.question_type,
                    if r.is_correct { "correct" } else { "incorrect" },
                    r.awarded,
                    r.points_possible,
                    r.attempts
                ));
            }
        }

        md
    }
}
