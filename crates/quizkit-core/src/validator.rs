//! Default answer validation and scoring.
//!
//! All per-type comparison semantics live here, dispatched over the value
//! tag in one exhaustive `match`. A question's own custom validator (if any)
//! replaces this logic for that question only; composite questions are
//! scored by recursive aggregation over their sub-questions.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{AnswerType, Question};
use crate::results::Validation;
use crate::value::{AnswerValue, LabelPlacement, Point};

/// Options governing the default validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Proportional credit for relation-style answers instead of
    /// all-or-nothing.
    pub partial_credit_enabled: bool,
    /// Radius within which coordinate answers count as matching.
    pub coordinate_tolerance: f64,
    /// Maximum composite nesting depth before validation fails.
    pub max_composite_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            partial_credit_enabled: false,
            coordinate_tolerance: 0.0,
            max_composite_depth: 8,
        }
    }
}

/// Compare a submitted value against the expected one.
///
/// A type-tag mismatch is never partially creditable: it always yields
/// `{is_correct: false, score: 0}`.
pub fn validate_values(
    user: &AnswerValue,
    correct: &AnswerValue,
    cfg: &ValidationConfig,
) -> Validation {
    if user.kind() != correct.kind() {
        return Validation::incorrect();
    }

    match (user, correct) {
        (AnswerValue::Text(a), AnswerValue::Text(b)) => exact(a == b),
        (AnswerValue::Number(a), AnswerValue::Number(b)) => exact(a == b),
        (AnswerValue::Boolean(a), AnswerValue::Boolean(b)) => exact(a == b),
        (AnswerValue::Canvas(a), AnswerValue::Canvas(b)) => exact(a == b),
        (AnswerValue::Media(a), AnswerValue::Media(b)) => exact(a == b),
        (AnswerValue::Coordinates(a), AnswerValue::Coordinates(b)) => {
            exact(a.distance(b) <= cfg.coordinate_tolerance)
        }
        // Order-sensitive: the sequence itself is the answer.
        (AnswerValue::ArrayReorder(a), AnswerValue::ArrayReorder(b)) => exact(a == b),
        // Order-insensitive relation sets.
        (AnswerValue::ArrayMatch(a), AnswerValue::ArrayMatch(b)) => relation_score(a, b, cfg),
        (AnswerValue::ArrayDragAndDrop(a), AnswerValue::ArrayDragAndDrop(b)) => {
            relation_score(a, b, cfg)
        }
        (AnswerValue::ArrayCategorize(a), AnswerValue::ArrayCategorize(b)) => {
            relation_score(a, b, cfg)
        }
        (AnswerValue::ArrayLabeling(a), AnswerValue::ArrayLabeling(b)) => {
            labeling_score(a, b, cfg)
        }
        (AnswerValue::ArrayGraphing(a), AnswerValue::ArrayGraphing(b)) => {
            graphing_score(a, b, cfg)
        }
        (AnswerValue::ArrayWordCloud(a), AnswerValue::ArrayWordCloud(b)) => {
            word_cloud_score(a, b, cfg)
        }
        // Kinds already compared equal above.
        _ => unreachable!("mismatched kinds filtered before dispatch"),
    }
}

fn exact(matches: bool) -> Validation {
    if matches {
        Validation::correct()
    } else {
        Validation::incorrect()
    }
}

/// Set equality over relation pairs, order-insensitive. With partial credit
/// the score is `matched_pairs / total_expected_pairs`; extra wrong pairs do
/// not earn or cost anything but do block full credit.
fn relation_score<T: Eq + Hash>(user: &[T], expected: &[T], cfg: &ValidationConfig) -> Validation {
    if expected.is_empty() {
        return exact(user.is_empty());
    }

    let user_set: HashSet<&T> = user.iter().collect();
    let expected_set: HashSet<&T> = expected.iter().collect();
    let matched = expected_set.intersection(&user_set).count();

    if user_set == expected_set {
        Validation::correct()
    } else if cfg.partial_credit_enabled {
        let mut v = Validation::fraction(matched as f64 / expected_set.len() as f64);
        // Extraneous pairs keep an otherwise-complete submission from
        // counting as fully correct.
        v.is_correct = false;
        v
    } else {
        Validation::incorrect()
    }
}

/// Labeling compares label ids exactly and positions within the coordinate
/// tolerance, order-insensitive.
fn labeling_score(
    user: &[LabelPlacement],
    expected: &[LabelPlacement],
    cfg: &ValidationConfig,
) -> Validation {
    if expected.is_empty() {
        return exact(user.is_empty());
    }

    let matched = expected
        .iter()
        .filter(|exp| {
            user.iter().any(|u| {
                u.label_id == exp.label_id
                    && u.position.distance(&exp.position) <= cfg.coordinate_tolerance
            })
        })
        .count();

    let complete = matched == expected.len() && user.len() == expected.len();
    if complete {
        Validation::correct()
    } else if cfg.partial_credit_enabled {
        let mut v = Validation::fraction(matched as f64 / expected.len() as f64);
        v.is_correct = false;
        v
    } else {
        Validation::incorrect()
    }
}

/// Each submitted point is matched greedily to the nearest unclaimed
/// expected point within tolerance; the score is the fraction of expected
/// points matched, order-insensitive. Always proportional: a plot is
/// naturally partial-credit.
fn graphing_score(user: &[Point], expected: &[Point], cfg: &ValidationConfig) -> Validation {
    if expected.is_empty() {
        return exact(user.is_empty());
    }

    let mut claimed = vec![false; expected.len()];
    let mut matched = 0usize;

    for point in user {
        let nearest = expected
            .iter()
            .enumerate()
            .filter(|(i, exp)| !claimed[*i] && point.distance(exp) <= cfg.coordinate_tolerance)
            .min_by(|(_, a), (_, b)| {
                point
                    .distance(a)
                    .partial_cmp(&point.distance(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        if let Some((i, _)) = nearest {
            claimed[i] = true;
            matched += 1;
        }
    }

    if matched == expected.len() && user.len() == expected.len() {
        Validation::correct()
    } else {
        let mut v = Validation::fraction(matched as f64 / expected.len() as f64);
        v.is_correct = false;
        v
    }
}

/// Set equality over normalized (case-folded, trimmed) words. With partial
/// credit the score is the overlap fraction.
fn word_cloud_score(user: &[String], expected: &[String], cfg: &ValidationConfig) -> Validation {
    let normalize =
        |words: &[String]| -> HashSet<String> { words.iter().map(|w| w.trim().to_lowercase()).collect() };

    let user_set = normalize(user);
    let expected_set = normalize(expected);

    if expected_set.is_empty() {
        return exact(user_set.is_empty());
    }

    if user_set == expected_set {
        Validation::correct()
    } else if cfg.partial_credit_enabled {
        let overlap = expected_set.intersection(&user_set).count();
        let mut v = Validation::fraction(overlap as f64 / expected_set.len() as f64);
        v.is_correct = false;
        v
    } else {
        Validation::incorrect()
    }
}

/// Score a single (non-composite) question's submission.
///
/// Resolution order: the question's own validator if attached, otherwise the
/// default per-type logic for objective questions; non-evaluated questions
/// without a validator are recorded but score zero here.
pub fn score_question(
    question: &Question,
    value: &AnswerValue,
    cfg: &ValidationConfig,
) -> Result<Validation, QuizError> {
    if let Some(custom) = &question.validator {
        return Ok(custom.validate(value, question.correct_answer.as_ref()));
    }

    if question.is_composite() {
        return Err(QuizError::InvalidQuiz(format!(
            "question {} is composite and is scored from its sub-questions",
            question.id
        )));
    }

    if question.answer_type() == AnswerType::NonEvaluated {
        return Ok(Validation::incorrect());
    }

    let correct = question.correct_answer.as_ref().ok_or_else(|| {
        QuizError::InvalidQuiz(format!(
            "objective question {} has no correct answer",
            question.id
        ))
    })?;

    Ok(validate_values(value, correct, cfg))
}

/// Aggregate a composite question's score from recorded sub-answers.
///
/// `lookup` resolves a question id to its latest submitted value. Each
/// sub-question contributes an equal share; unanswered sub-questions
/// contribute zero. Depth is tracked explicitly so pathological nesting
/// fails with [`QuizError::RecursionLimitExceeded`] instead of recursing
/// unbounded.
pub fn composite_score(
    question: &Question,
    lookup: &dyn Fn(&str) -> Option<AnswerValue>,
    cfg: &ValidationConfig,
    depth: usize,
) -> Result<Validation, QuizError> {
    if depth >= cfg.max_composite_depth {
        return Err(QuizError::RecursionLimitExceeded(cfg.max_composite_depth));
    }

    let subs = question.sub_questions();
    if subs.is_empty() {
        return Ok(Validation::incorrect());
    }

    let mut total = 0.0;
    for sub in subs {
        let fraction = if sub.is_composite() {
            composite_score(sub, lookup, cfg, depth + 1)?.score
        } else {
            match lookup(&sub.id) {
                Some(value) => score_question(sub, &value, cfg)?.score,
                None => 0.0,
            }
        };
        total += fraction;
    }

    Ok(Validation::fraction(total / subs.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionPayload, QuestionType};
    use crate::value::{Categorization, MatchEntry, Placement, ReorderKey};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn cfg() -> ValidationConfig {
        ValidationConfig::default()
    }

    fn partial_cfg() -> ValidationConfig {
        ValidationConfig {
            partial_credit_enabled: true,
            ..Default::default()
        }
    }

    fn pair(left: &str, right: &str) -> MatchEntry {
        MatchEntry {
            left: left.into(),
            right: right.into(),
        }
    }

    #[test]
    fn identical_values_score_max_for_every_kind() {
        let samples = vec![
            AnswerValue::text("B"),
            AnswerValue::Number(42.0),
            AnswerValue::Boolean(true),
            AnswerValue::Coordinates(Point::new(1.0, 2.0)),
            AnswerValue::Canvas("svg-data".into()),
            AnswerValue::Media("clip.mp4".into()),
            AnswerValue::ArrayReorder(vec![ReorderKey::from("a"), ReorderKey::from("b")]),
            AnswerValue::ArrayDragAndDrop(vec![Placement {
                item_id: "i1".into(),
                target_id: "t1".into(),
            }]),
            AnswerValue::ArrayCategorize(vec![Categorization {
                item_id: "i1".into(),
                category_id: "c1".into(),
            }]),
            AnswerValue::ArrayLabeling(vec![LabelPlacement {
                label_id: "l1".into(),
                position: Point::new(0.0, 0.0),
            }]),
            AnswerValue::ArrayMatch(vec![pair("a", "1")]),
            AnswerValue::ArrayGraphing(vec![Point::new(1.0, 1.0)]),
            AnswerValue::ArrayWordCloud(vec!["rust".into()]),
        ];

        for value in samples {
            let v = validate_values(&value, &value, &cfg());
            assert!(v.is_correct, "expected full credit for {value:?}");
            assert!((v.score - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn kind_mismatch_scores_zero_regardless_of_content() {
        let v = validate_values(&AnswerValue::Number(1.0), &AnswerValue::text("1"), &partial_cfg());
        assert!(!v.is_correct);
        assert_eq!(v.score, 0.0);
    }

    #[test]
    fn reorder_is_order_sensitive() {
        let correct = AnswerValue::ArrayReorder(vec![
            ReorderKey::from("a"),
            ReorderKey::from("b"),
            ReorderKey::from("c"),
        ]);
        let swapped = AnswerValue::ArrayReorder(vec![
            ReorderKey::from("b"),
            ReorderKey::from("a"),
            ReorderKey::from("c"),
        ]);
        assert!(validate_values(&correct, &correct, &cfg()).is_correct);
        assert!(!validate_values(&swapped, &correct, &cfg()).is_correct);
    }

    #[test]
    fn match_is_order_insensitive() {
        let correct = AnswerValue::ArrayMatch(vec![pair("a", "1"), pair("b", "2")]);
        let reordered = AnswerValue::ArrayMatch(vec![pair("b", "2"), pair("a", "1")]);
        let v = validate_values(&reordered, &correct, &cfg());
        assert!(v.is_correct);
        assert!((v.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn categorize_partial_credit_is_proportional() {
        let correct = AnswerValue::ArrayCategorize(vec![
            Categorization {
                item_id: "i1".into(),
                category_id: "c1".into(),
            },
            Categorization {
                item_id: "i2".into(),
                category_id: "c2".into(),
            },
        ]);
        let half = AnswerValue::ArrayCategorize(vec![
            Categorization {
                item_id: "i1".into(),
                category_id: "c1".into(),
            },
            Categorization {
                item_id: "i2".into(),
                category_id: "c1".into(),
            },
        ]);

        // All-or-nothing without partial credit.
        let v = validate_values(&half, &correct, &cfg());
        assert!(!v.is_correct);
        assert_eq!(v.score, 0.0);

        let v = validate_values(&half, &correct, &partial_cfg());
        assert!(!v.is_correct);
        assert!((v.score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn coordinates_respect_tolerance() {
        let correct = AnswerValue::Coordinates(Point::new(10.0, 10.0));
        let near = AnswerValue::Coordinates(Point::new(11.0, 10.0));

        assert!(!validate_values(&near, &correct, &cfg()).is_correct);

        let tolerant = ValidationConfig {
            coordinate_tolerance: 2.0,
            ..Default::default()
        };
        assert!(validate_values(&near, &correct, &tolerant).is_correct);
    }

    #[test]
    fn graphing_scores_fraction_of_points_within_tolerance() {
        let correct = AnswerValue::ArrayGraphing(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 4.0),
        ]);
        let submitted = AnswerValue::ArrayGraphing(vec![
            Point::new(1.0, 1.0),
            Point::new(0.05, 0.0),
            Point::new(9.0, 9.0),
        ]);

        let tolerant = ValidationConfig {
            coordinate_tolerance: 0.1,
            ..Default::default()
        };
        let v = validate_values(&submitted, &correct, &tolerant);
        assert!(!v.is_correct);
        assert!((v.score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn graphing_is_order_insensitive() {
        let correct = AnswerValue::ArrayGraphing(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        let reversed = AnswerValue::ArrayGraphing(vec![Point::new(1.0, 1.0), Point::new(0.0, 0.0)]);
        assert!(validate_values(&reversed, &correct, &cfg()).is_correct);
    }

    #[test]
    fn word_cloud_normalizes_case_and_whitespace() {
        let correct = AnswerValue::ArrayWordCloud(vec!["Rust".into(), "quiz".into()]);
        let submitted = AnswerValue::ArrayWordCloud(vec!["  rust ".into(), "QUIZ".into()]);
        assert!(validate_values(&submitted, &correct, &cfg()).is_correct);
    }

    #[test]
    fn word_cloud_partial_overlap() {
        let correct = AnswerValue::ArrayWordCloud(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        let submitted = AnswerValue::ArrayWordCloud(vec!["a".into(), "x".into()]);
        let v = validate_values(&submitted, &correct, &partial_cfg());
        assert!(!v.is_correct);
        assert!((v.score - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn custom_validator_overrides_default() {
        use crate::traits::FnValidator;

        let q = Question::new("q1", "Free text", QuestionPayload::OpenEnded { max_length: 100 })
            .with_validator(Arc::new(FnValidator(
                |user: &AnswerValue, _: Option<&AnswerValue>| {
                    if matches!(user, AnswerValue::Text(s) if s.contains("ownership")) {
                        Validation::correct()
                    } else {
                        Validation::incorrect()
                    }
                },
            )));

        // Non-evaluated by type, but the custom validator scores it.
        assert_eq!(q.answer_type(), AnswerType::NonEvaluated);
        let v = score_question(&q, &AnswerValue::text("borrowing and ownership"), &cfg()).unwrap();
        assert!(v.is_correct);
    }

    #[test]
    fn non_evaluated_without_validator_scores_zero() {
        let q = Question::new("d1", "Draw it", QuestionPayload::Draw);
        let v = score_question(&q, &AnswerValue::Canvas("scribble".into()), &cfg()).unwrap();
        assert!(!v.is_correct);
        assert_eq!(v.score, 0.0);
    }

    #[test]
    fn objective_without_correct_answer_is_invalid() {
        let q = Question::new("q1", "Pick", QuestionPayload::MultiChoice { options: vec![] });
        let err = score_question(&q, &AnswerValue::text("A"), &cfg()).unwrap_err();
        assert!(matches!(err, QuizError::InvalidQuiz(_)));
    }

    fn sub_mc(id: &str) -> Question {
        Question::new(id, "Pick", QuestionPayload::MultiChoice { options: vec![] })
            .with_correct_answer(AnswerValue::text("B"))
    }

    fn passage(id: &str, subs: Vec<Question>) -> Question {
        Question::new(
            id,
            "Read the passage",
            QuestionPayload::ReadingComprehension {
                passage: "Lorem ipsum".into(),
                sub_questions: subs,
            },
        )
    }

    #[test]
    fn composite_aggregates_sub_results() {
        let q = passage("p1", vec![sub_mc("p1-a"), sub_mc("p1-b")]);

        let mut answers = HashMap::new();
        answers.insert("p1-a".to_string(), AnswerValue::text("B"));
        answers.insert("p1-b".to_string(), AnswerValue::text("A"));
        let lookup = |id: &str| answers.get(id).cloned();

        let v = composite_score(&q, &lookup, &cfg(), 0).unwrap();
        assert!(!v.is_correct);
        assert!((v.score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn composite_unanswered_subs_count_zero() {
        let q = passage("p1", vec![sub_mc("p1-a"), sub_mc("p1-b")]);
        let lookup = |_: &str| None;
        let v = composite_score(&q, &lookup, &cfg(), 0).unwrap();
        assert_eq!(v.score, 0.0);
    }

    #[test]
    fn nested_composite_recursion_is_bounded() {
        // Build a chain deeper than the limit.
        let mut q = sub_mc("leaf");
        for i in 0..10 {
            q = passage(&format!("p{i}"), vec![q]);
        }
        assert_eq!(q.question_type(), QuestionType::ReadingComprehension);

        let lookup = |_: &str| Some(AnswerValue::text("B"));
        let err = composite_score(&q, &lookup, &cfg(), 0).unwrap_err();
        assert!(matches!(err, QuizError::RecursionLimitExceeded(8)));
    }

    #[test]
    fn nested_composite_within_limit_aggregates() {
        let inner = passage("inner", vec![sub_mc("inner-a")]);
        let outer = passage("outer", vec![inner, sub_mc("outer-b")]);

        let mut answers = HashMap::new();
        answers.insert("inner-a".to_string(), AnswerValue::text("B"));
        answers.insert("outer-b".to_string(), AnswerValue::text("B"));
        let lookup = |id: &str| answers.get(id).cloned();

        let v = composite_score(&outer, &lookup, &cfg(), 0).unwrap();
        assert!(v.is_correct);
        assert!((v.score - 1.0).abs() < f64::EPSILON);
    }
}
