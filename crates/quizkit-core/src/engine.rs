//! Attempt lifecycle state machine.
//!
//! One [`QuizEngine`] exclusively owns one [`QuizState`]. Every mutating
//! operation takes `&mut self`, so submissions and navigation against the
//! same attempt are serialized by the borrow checker; callers that need
//! shared access wrap the engine in their own mutex. The only suspension
//! point is the page fetch at the [`QuestionLoader`] boundary; everything
//! else is synchronous.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::QuizError;
use crate::model::{AnswerType, Question, Quiz};
use crate::results::{Answer, Validation};
use crate::state::{AttemptMetadata, QuizPhase, QuizState};
use crate::traits::QuestionLoader;
use crate::validator::{composite_score, score_question, ValidationConfig};
use crate::value::{AnswerValue, LocalizedText};

/// Recognized engine options.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Proportional credit for relation-style answers.
    pub partial_credit_enabled: bool,
    /// Match radius for coordinate answers.
    pub coordinate_tolerance: f64,
    /// Accept submissions for any known question, not just the current one.
    pub allow_out_of_order_submission: bool,
    /// Page size requested from a question loader.
    pub page_window_size: usize,
    /// Composite nesting limit.
    pub max_composite_depth: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            partial_credit_enabled: false,
            coordinate_tolerance: 0.0,
            allow_out_of_order_submission: false,
            page_window_size: 10,
            max_composite_depth: 8,
        }
    }
}

impl QuizConfig {
    fn validation(&self) -> ValidationConfig {
        ValidationConfig {
            partial_credit_enabled: self.partial_credit_enabled,
            coordinate_tolerance: self.coordinate_tolerance,
            max_composite_depth: self.max_composite_depth,
        }
    }
}

/// Where questions come from: a fully materialized sequence, or a paged
/// loader with a prefetch cache keyed by global index.
enum QuestionSource {
    Materialized(Vec<Arc<Question>>),
    Loader {
        loader: Arc<dyn QuestionLoader>,
        total: usize,
        cache: HashMap<usize, Arc<Question>>,
    },
}

/// The quiz progression and answer-validation engine.
pub struct QuizEngine {
    state: QuizState,
    source: QuestionSource,
    config: QuizConfig,
    /// Every known question (including sub-questions) by id.
    index: HashMap<String, Arc<Question>>,
    /// Ids that are sub-questions of some composite.
    sub_ids: HashSet<String>,
    /// Top-level composite question ids, for score aggregation.
    composite_ids: Vec<String>,
    /// Highest cursor position reached so far.
    high_water: usize,
    /// Active-time snapshot when the cursor entered the current question.
    entered_at_secs: f64,
}

impl std::fmt::Debug for QuizEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizEngine")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("sub_ids", &self.sub_ids)
            .field("composite_ids", &self.composite_ids)
            .field("high_water", &self.high_water)
            .field("entered_at_secs", &self.entered_at_secs)
            .finish_non_exhaustive()
    }
}

impl QuizEngine {
    /// Build an attempt over a fully materialized question sequence.
    pub fn new(questions: Vec<Question>, config: QuizConfig) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::InvalidQuiz(
                "attempt has no questions and no loader".into(),
            ));
        }

        let mut engine = Self {
            state: QuizState::new(None),
            source: QuestionSource::Materialized(Vec::new()),
            config,
            index: HashMap::new(),
            sub_ids: HashSet::new(),
            composite_ids: Vec::new(),
            high_water: 0,
            entered_at_secs: 0.0,
        };

        let mut materialized = Vec::with_capacity(questions.len());
        for question in questions {
            let question = Arc::new(question);
            engine.register(&question, false)?;
            materialized.push(question);
        }
        engine.source = QuestionSource::Materialized(materialized);
        Ok(engine)
    }

    /// Build an attempt for a whole [`Quiz`], carrying its id and maximum
    /// score into the attempt metadata.
    pub fn for_quiz(quiz: Quiz, config: QuizConfig) -> Result<Self, QuizError> {
        let metadata = AttemptMetadata {
            quiz_id: quiz.id.clone(),
            user_id: None,
            total_points_possible: quiz.total_points(),
        };
        let mut engine = Self::new(quiz.questions, config)?;
        engine.state.metadata = Some(metadata);
        Ok(engine)
    }

    /// Build an attempt backed by a paged question loader. The loader's
    /// order and `total_questions` are authoritative for navigation bounds.
    pub fn with_loader(
        loader: Arc<dyn QuestionLoader>,
        config: QuizConfig,
    ) -> Result<Self, QuizError> {
        if loader.total_questions() == 0 {
            return Err(QuizError::InvalidQuiz("loader reports zero questions".into()));
        }
        if config.page_window_size == 0 {
            return Err(QuizError::InvalidQuiz("page window size must be nonzero".into()));
        }

        let total = loader.total_questions();
        Ok(Self {
            state: QuizState::new(None),
            source: QuestionSource::Loader {
                loader,
                total,
                cache: HashMap::new(),
            },
            config,
            index: HashMap::new(),
            sub_ids: HashSet::new(),
            composite_ids: Vec::new(),
            high_water: 0,
            entered_at_secs: 0.0,
        })
    }

    /// Index a question and its composite descendants. `as_sub` marks
    /// everything below a passage so it never double-counts in the total.
    fn register(&mut self, question: &Arc<Question>, as_sub: bool) -> Result<(), QuizError> {
        if question.nesting_depth() > self.config.max_composite_depth {
            return Err(QuizError::RecursionLimitExceeded(self.config.max_composite_depth));
        }

        if let Some(existing) = self.index.get(&question.id) {
            if **existing != **question {
                return Err(QuizError::InvalidQuiz(format!(
                    "duplicate question id with conflicting content: {}",
                    question.id
                )));
            }
            return Ok(());
        }

        self.index.insert(question.id.clone(), Arc::clone(question));
        if as_sub {
            self.sub_ids.insert(question.id.clone());
        } else if question.is_composite() {
            self.composite_ids.push(question.id.clone());
        }

        for sub in question.sub_questions() {
            let sub = Arc::new(sub.clone());
            self.register(&sub, true)?;
        }
        Ok(())
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Authoritative question count for navigation bounds.
    pub fn total_questions(&self) -> usize {
        match &self.source {
            QuestionSource::Materialized(questions) => questions.len(),
            QuestionSource::Loader { total, .. } => *total,
        }
    }

    fn question_at(&self, index: usize) -> Option<Arc<Question>> {
        match &self.source {
            QuestionSource::Materialized(questions) => questions.get(index).cloned(),
            QuestionSource::Loader { cache, .. } => cache.get(&index).cloned(),
        }
    }

    /// Materialize the question at `index`, fetching its page if needed.
    async fn ensure_loaded(&mut self, index: usize) -> Result<Arc<Question>, QuizError> {
        if index >= self.total_questions() {
            return Err(QuizError::NavigationBoundary(format!(
                "index {index} out of range 0..{}",
                self.total_questions()
            )));
        }

        if let Some(question) = self.question_at(index) {
            return Ok(question);
        }

        let (loader, total) = match &self.source {
            QuestionSource::Materialized(_) => {
                // Materialized sources are fully resident; a miss is a
                // genuine out-of-range access handled above.
                unreachable!("materialized source cannot miss in range")
            }
            QuestionSource::Loader { loader, total, .. } => (Arc::clone(loader), *total),
        };

        let page_start = index - index % self.config.page_window_size;
        let count = self.config.page_window_size.min(total - page_start);
        tracing::debug!(page_start, count, "fetching question page");

        let batch = loader
            .load_questions(page_start, count)
            .await
            .map_err(|e| QuizError::LoaderFailure(format!("{e:#}")))?;

        if batch.is_empty() {
            return Err(QuizError::LoaderFailure(format!(
                "loader returned an empty page at index {page_start}"
            )));
        }
        if batch.len() > count {
            return Err(QuizError::LoaderFailure(format!(
                "loader returned {} questions for a page of {count}",
                batch.len()
            )));
        }

        let short_page = batch.len() < count;
        for (offset, question) in batch.into_iter().enumerate() {
            let question = Arc::new(question);
            self.register(&question, false)?;
            if let QuestionSource::Loader { cache, .. } = &mut self.source {
                cache.insert(page_start + offset, question);
            }
        }
        if short_page {
            tracing::warn!(page_start, "loader returned a short page; total is an upper bound");
        }

        // A short page can leave the requested index unmaterialized:
        // `total_questions` was an upper bound and the real end is nearer.
        self.question_at(index).ok_or_else(|| {
            QuizError::NavigationBoundary(format!("no question available at index {index}"))
        })
    }

    /// Start the attempt: stamps the start time, materializes the first
    /// page when loader-backed, and places the cursor at question 0.
    pub async fn start(&mut self) -> Result<(), QuizError> {
        if self.state.phase != QuizPhase::NotStarted {
            return Err(QuizError::InvalidStateTransition(format!(
                "cannot start from {:?}",
                self.state.phase
            )));
        }

        self.ensure_loaded(0).await?;
        self.state.started_at = Some(Utc::now());
        self.state.stopwatch.start();
        self.state.phase = QuizPhase::InProgress;
        self.state.current_index = 0;
        self.high_water = 0;
        self.entered_at_secs = 0.0;
        tracing::debug!(attempt = %self.state.attempt_id, "attempt started");
        Ok(())
    }

    /// The question at the cursor, fetching through the loader if needed.
    /// `Ok(None)` when the attempt has not started, is finished, or the
    /// cursor is past the real end of a short-paged source.
    pub async fn current_question(&mut self) -> Result<Option<Arc<Question>>, QuizError> {
        match self.state.phase {
            QuizPhase::NotStarted | QuizPhase::Completed => return Ok(None),
            QuizPhase::InProgress | QuizPhase::Paused => {}
        }
        match self.ensure_loaded(self.state.current_index).await {
            Ok(question) => Ok(Some(question)),
            Err(QuizError::NavigationBoundary(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether `id` names a sub-question of `root` at any depth.
    fn is_descendant(root: &Question, id: &str) -> bool {
        root.sub_questions()
            .iter()
            .any(|sub| sub.id == id || Self::is_descendant(sub, id))
    }

    /// Validate and record a submission for `question_id`.
    ///
    /// By default only the current question (or a sub-question of the
    /// current passage) is accepted; `allow_out_of_order_submission` lifts
    /// that to any known question. Resubmission replaces the prior answer's
    /// score contribution while the log keeps both records.
    pub fn submit_answer(
        &mut self,
        question_id: &str,
        value: AnswerValue,
    ) -> Result<Validation, QuizError> {
        if self.state.phase != QuizPhase::InProgress {
            return Err(QuizError::InvalidStateTransition(format!(
                "cannot submit while {:?}",
                self.state.phase
            )));
        }

        let question = self
            .index
            .get(question_id)
            .cloned()
            .ok_or_else(|| QuizError::UnknownQuestion(question_id.to_string()))?;

        if question.is_composite() {
            return Err(QuizError::InvalidQuiz(format!(
                "question {question_id} is composite; submit its sub-questions instead"
            )));
        }

        if !self.config.allow_out_of_order_submission {
            let current = self
                .question_at(self.state.current_index)
                .ok_or_else(|| QuizError::UnknownQuestion(question_id.to_string()))?;
            let targets_current =
                current.id == question_id || Self::is_descendant(&current, question_id);
            if !targets_current {
                return Err(QuizError::InvalidStateTransition(format!(
                    "question {question_id} is not the current question (out-of-order submission is disabled)"
                )));
            }
        }

        let expected = question.expected_kind();
        if value.kind() != expected {
            return Err(QuizError::AnswerTypeMismatch {
                question_id: question_id.to_string(),
                expected,
                got: value.kind(),
            });
        }

        let validation = score_question(&question, &value, &self.config.validation())?;

        let is_sub = self.sub_ids.contains(question_id);
        let scorable =
            question.answer_type() == AnswerType::Objective || question.validator.is_some();
        let answer = Answer {
            question_id: question_id.to_string(),
            value,
            is_correct: validation.is_correct,
            awarded: validation.score * question.points(),
            // Sub-answers contribute through their passage's aggregate.
            scored: scorable && !is_sub,
            submitted_at: Utc::now(),
            time_spent_secs: Some(
                (self.state.stopwatch.elapsed_secs() - self.entered_at_secs).max(0.0),
            ),
        };
        self.state.answers.record(answer);
        self.state.score = self.calculate_score();
        tracing::debug!(
            question = question_id,
            correct = validation.is_correct,
            score = self.state.score,
            "answer recorded"
        );
        Ok(validation)
    }

    /// Sum of awarded points over the latest answers, plus each composite's
    /// aggregate. Pure with respect to lifecycle phase.
    pub fn calculate_score(&self) -> f64 {
        let mut total: f64 = self
            .state
            .answers
            .latest_answers()
            .iter()
            .filter(|a| a.scored)
            .map(|a| a.awarded)
            .sum();

        let vcfg = self.config.validation();
        for id in &self.composite_ids {
            let Some(question) = self.index.get(id) else { continue };
            let lookup =
                |qid: &str| self.state.answers.latest(qid).map(|a| a.value.clone());
            match composite_score(question, &lookup, &vcfg, 0) {
                Ok(aggregate) => total += aggregate.score * question.points(),
                Err(e) => {
                    // Depth is bounded at registration, so this only fires
                    // for a corrupted source.
                    tracing::warn!(question = %id, error = %e, "composite aggregation failed");
                }
            }
        }
        total
    }

    /// Aggregate result for a composite question from recorded sub-answers.
    pub fn composite_result(&self, question_id: &str) -> Result<Validation, QuizError> {
        let question = self
            .index
            .get(question_id)
            .ok_or_else(|| QuizError::UnknownQuestion(question_id.to_string()))?;
        let lookup = |qid: &str| self.state.answers.latest(qid).map(|a| a.value.clone());
        composite_score(question, &lookup, &self.config.validation(), 0)
    }

    fn require_in_progress(&self, op: &str) -> Result<(), QuizError> {
        if self.state.phase != QuizPhase::InProgress {
            return Err(QuizError::InvalidStateTransition(format!(
                "cannot {op} while {:?}",
                self.state.phase
            )));
        }
        Ok(())
    }

    /// Advance the cursor, fetching the next page at a window boundary.
    /// Fails (state unchanged) at the last question.
    pub async fn next_question(&mut self) -> Result<(), QuizError> {
        self.require_in_progress("advance")?;
        let next = self.state.current_index + 1;
        if next >= self.total_questions() {
            return Err(QuizError::NavigationBoundary(
                "already at the last question".into(),
            ));
        }
        self.ensure_loaded(next).await?;
        self.state.current_index = next;
        self.high_water = self.high_water.max(next);
        self.entered_at_secs = self.state.stopwatch.elapsed_secs();
        Ok(())
    }

    /// Move the cursor back one question. Fails at index 0.
    pub async fn previous_question(&mut self) -> Result<(), QuizError> {
        self.require_in_progress("go back")?;
        if self.state.current_index == 0 {
            return Err(QuizError::NavigationBoundary(
                "already at the first question".into(),
            ));
        }
        let prev = self.state.current_index - 1;
        self.ensure_loaded(prev).await?;
        self.state.current_index = prev;
        self.entered_at_secs = self.state.stopwatch.elapsed_secs();
        Ok(())
    }

    /// Record the current question as skipped and advance. Same bounds as
    /// [`Self::next_question`].
    pub async fn skip_question(&mut self) -> Result<(), QuizError> {
        self.require_in_progress("skip")?;
        let current_id = self
            .question_at(self.state.current_index)
            .map(|q| q.id.clone());
        self.next_question().await?;
        if let Some(id) = current_id {
            if !self.state.skipped.contains(&id) {
                self.state.skipped.push(id);
            }
        }
        Ok(())
    }

    /// Freeze elapsed-time accounting.
    pub fn pause(&mut self) -> Result<(), QuizError> {
        self.require_in_progress("pause")?;
        self.state.stopwatch.pause();
        self.state.phase = QuizPhase::Paused;
        tracing::debug!(attempt = %self.state.attempt_id, "attempt paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), QuizError> {
        if self.state.phase != QuizPhase::Paused {
            return Err(QuizError::InvalidStateTransition(format!(
                "cannot resume from {:?}",
                self.state.phase
            )));
        }
        self.state.stopwatch.start();
        self.state.phase = QuizPhase::InProgress;
        tracing::debug!(attempt = %self.state.attempt_id, "attempt resumed");
        Ok(())
    }

    /// Shuffle the not-yet-visited, unanswered remainder of a materialized
    /// question sequence. Visited and answered questions keep their
    /// positions so the recorded history stays meaningful.
    pub fn shuffle_questions<R: Rng>(&mut self, rng: &mut R) -> Result<(), QuizError> {
        match self.state.phase {
            QuizPhase::NotStarted | QuizPhase::InProgress => {}
            phase => {
                return Err(QuizError::InvalidStateTransition(format!(
                    "cannot shuffle while {phase:?}"
                )))
            }
        }

        let questions = match &mut self.source {
            QuestionSource::Loader { .. } => {
                return Err(QuizError::ShuffleUnsupported(
                    "the loader's server-side question order is authoritative".into(),
                ))
            }
            QuestionSource::Materialized(questions) => questions,
        };

        let first_movable = if self.state.phase == QuizPhase::NotStarted {
            0
        } else {
            self.high_water + 1
        };
        let movable: Vec<usize> = (first_movable..questions.len())
            .filter(|i| !self.state.answers.has_answer(&questions[*i].id))
            .collect();

        let mut picked: Vec<Arc<Question>> =
            movable.iter().map(|&i| Arc::clone(&questions[i])).collect();
        picked.shuffle(rng);
        for (slot, question) in movable.into_iter().zip(picked) {
            questions[slot] = question;
        }
        tracing::debug!(from = first_movable, "remaining questions shuffled");
        Ok(())
    }

    /// Finish the attempt: stamps the end time, freezes the stopwatch, and
    /// fixes the final score. Idempotent once completed.
    pub fn end(&mut self) -> Result<(), QuizError> {
        if self.state.phase == QuizPhase::Completed {
            return Ok(());
        }
        self.state.stopwatch.pause();
        self.state.ended_at = Some(Utc::now());
        self.state.score = self.calculate_score();
        self.state.phase = QuizPhase::Completed;
        tracing::debug!(
            attempt = %self.state.attempt_id,
            score = self.state.score,
            "attempt completed"
        );
        Ok(())
    }

    /// The hint attached to a question, if any. Unknown ids yield `None`.
    pub fn hint(&self, question_id: &str) -> Option<&LocalizedText> {
        self.index.get(question_id).and_then(|q| q.hint())
    }

    /// Look up any known question (including sub-questions) by id.
    pub fn question(&self, question_id: &str) -> Option<&Arc<Question>> {
        self.index.get(question_id)
    }

    /// Ids of the top-level composite questions seen so far.
    pub fn composite_ids(&self) -> &[String] {
        &self.composite_ids
    }
}
