//! Question data model.
//!
//! A [`Question`] is a shared base record plus a [`QuestionPayload`] variant
//! per question type. Validation dispatches on the payload tag (see
//! [`crate::validator`]) so the per-type logic stays exhaustive in one place
//! rather than spread across virtual methods.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::traits::AnswerValidator;
use crate::value::{AnswerValue, LocalizedText, OptionValue, ValueKind};

/// All supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    MultiChoice,
    FillInTheBlank,
    ReadingComprehension,
    Matching,
    #[serde(rename = "DRAG_N_DROP")]
    DragNDrop,
    ImageHotspot,
    Classify,
    Reorder,
    Dropdown,
    ImageTagging,
    Survey,
    Poll,
    OpenEnded,
    Draw,
    VideoResponse,
    AudioResponse,
    WordCloud,
    MathInput,
    GraphPlotting,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuestionType::MultiChoice => "MULTI_CHOICE",
            QuestionType::FillInTheBlank => "FILL_IN_THE_BLANK",
            QuestionType::ReadingComprehension => "READING_COMPREHENSION",
            QuestionType::Matching => "MATCHING",
            QuestionType::DragNDrop => "DRAG_N_DROP",
            QuestionType::ImageHotspot => "IMAGE_HOTSPOT",
            QuestionType::Classify => "CLASSIFY",
            QuestionType::Reorder => "REORDER",
            QuestionType::Dropdown => "DROPDOWN",
            QuestionType::ImageTagging => "IMAGE_TAGGING",
            QuestionType::Survey => "SURVEY",
            QuestionType::Poll => "POLL",
            QuestionType::OpenEnded => "OPEN_ENDED",
            QuestionType::Draw => "DRAW",
            QuestionType::VideoResponse => "VIDEO_RESPONSE",
            QuestionType::AudioResponse => "AUDIO_RESPONSE",
            QuestionType::WordCloud => "WORD_CLOUD",
            QuestionType::MathInput => "MATH_INPUT",
            QuestionType::GraphPlotting => "GRAPH_PLOTTING",
        };
        write!(f, "{s}")
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown question type: {s}"))
    }
}

/// Whether a question type is machine-scorable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    /// Scored by the engine (or a custom validator).
    Objective,
    /// Recorded only; scored only if a custom validator is attached.
    NonEvaluated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    Line,
    Bar,
    Scatter,
}

/// A selectable, orderable, or placeable unit within a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub value: OptionValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LocalizedText>,
}

/// One expected left/right pairing in a matching question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: QuestionOption,
    pub right: QuestionOption,
}

/// Optional per-question metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyLevel>,
    /// Weight of this question in the total score. Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<LocalizedText>,
}

/// Per-type question payload, tagged by [`QuestionType`] on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionPayload {
    MultiChoice {
        options: Vec<QuestionOption>,
    },
    FillInTheBlank,
    /// A passage owning nested sub-questions; correctness is the aggregate
    /// of sub-question results, never a direct comparison.
    #[serde(rename_all = "camelCase")]
    ReadingComprehension {
        passage: LocalizedText,
        sub_questions: Vec<Question>,
    },
    Matching {
        pairs: Vec<MatchPair>,
    },
    #[serde(rename = "DRAG_N_DROP")]
    DragNDrop {
        items: Vec<QuestionOption>,
        targets: Vec<QuestionOption>,
    },
    #[serde(rename_all = "camelCase")]
    ImageHotspot {
        image_url: String,
        hotspots: Vec<QuestionOption>,
    },
    Classify {
        items: Vec<QuestionOption>,
        categories: Vec<QuestionOption>,
    },
    Reorder {
        items: Vec<QuestionOption>,
    },
    Dropdown {
        options: Vec<QuestionOption>,
    },
    #[serde(rename_all = "camelCase")]
    ImageTagging {
        image_url: String,
        labels: Vec<QuestionOption>,
    },
    Survey {
        options: Vec<QuestionOption>,
    },
    Poll {
        options: Vec<QuestionOption>,
    },
    #[serde(rename_all = "camelCase")]
    OpenEnded {
        max_length: usize,
    },
    Draw,
    #[serde(rename_all = "camelCase")]
    VideoResponse {
        max_duration_secs: u64,
    },
    #[serde(rename_all = "camelCase")]
    AudioResponse {
        max_duration_secs: u64,
    },
    #[serde(rename_all = "camelCase")]
    WordCloud {
        max_words: usize,
    },
    MathInput {
        equation: LocalizedText,
    },
    #[serde(rename_all = "camelCase")]
    GraphPlotting {
        graph_type: GraphType,
        data_points: Vec<QuestionOption>,
    },
}

/// A single quiz question: shared base record plus per-type payload.
///
/// Questions are built once by the content source and are read-only during
/// an attempt; the engine never mutates them.
#[derive(Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: LocalizedText,
    #[serde(flatten)]
    pub payload: QuestionPayload,
    /// Expected answer. Required for objective leaf questions; ignored
    /// (placeholder) for composite questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<AnswerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<QuestionMetadata>,
    /// Per-question validation override. Checked before the default
    /// per-type validator; not serialized.
    #[serde(skip)]
    pub validator: Option<Arc<dyn AnswerValidator>>,
}

impl Question {
    /// A question with just the required fields.
    pub fn new(id: impl Into<String>, text: impl Into<LocalizedText>, payload: QuestionPayload) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            payload,
            correct_answer: None,
            metadata: None,
            validator: None,
        }
    }

    pub fn with_correct_answer(mut self, answer: AnswerValue) -> Self {
        self.correct_answer = Some(answer);
        self
    }

    pub fn with_metadata(mut self, metadata: QuestionMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn AnswerValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn question_type(&self) -> QuestionType {
        match &self.payload {
            QuestionPayload::MultiChoice { .. } => QuestionType::MultiChoice,
            QuestionPayload::FillInTheBlank => QuestionType::FillInTheBlank,
            QuestionPayload::ReadingComprehension { .. } => QuestionType::ReadingComprehension,
            QuestionPayload::Matching { .. } => QuestionType::Matching,
            QuestionPayload::DragNDrop { .. } => QuestionType::DragNDrop,
            QuestionPayload::ImageHotspot { .. } => QuestionType::ImageHotspot,
            QuestionPayload::Classify { .. } => QuestionType::Classify,
            QuestionPayload::Reorder { .. } => QuestionType::Reorder,
            QuestionPayload::Dropdown { .. } => QuestionType::Dropdown,
            QuestionPayload::ImageTagging { .. } => QuestionType::ImageTagging,
            QuestionPayload::Survey { .. } => QuestionType::Survey,
            QuestionPayload::Poll { .. } => QuestionType::Poll,
            QuestionPayload::OpenEnded { .. } => QuestionType::OpenEnded,
            QuestionPayload::Draw => QuestionType::Draw,
            QuestionPayload::VideoResponse { .. } => QuestionType::VideoResponse,
            QuestionPayload::AudioResponse { .. } => QuestionType::AudioResponse,
            QuestionPayload::WordCloud { .. } => QuestionType::WordCloud,
            QuestionPayload::MathInput { .. } => QuestionType::MathInput,
            QuestionPayload::GraphPlotting { .. } => QuestionType::GraphPlotting,
        }
    }

    /// Partition of this type into machine-scorable vs recorded-only.
    pub fn answer_type(&self) -> AnswerType {
        match self.question_type() {
            QuestionType::MultiChoice
            | QuestionType::ReadingComprehension
            | QuestionType::Matching
            | QuestionType::DragNDrop
            | QuestionType::ImageHotspot
            | QuestionType::Classify
            | QuestionType::Reorder
            | QuestionType::Dropdown
            | QuestionType::ImageTagging
            | QuestionType::MathInput
            | QuestionType::GraphPlotting => AnswerType::Objective,
            QuestionType::FillInTheBlank
            | QuestionType::Survey
            | QuestionType::Poll
            | QuestionType::OpenEnded
            | QuestionType::Draw
            | QuestionType::VideoResponse
            | QuestionType::AudioResponse
            | QuestionType::WordCloud => AnswerType::NonEvaluated,
        }
    }

    /// The value shape a submission for this question must have.
    pub fn expected_kind(&self) -> ValueKind {
        match self.question_type() {
            QuestionType::MultiChoice
            | QuestionType::FillInTheBlank
            | QuestionType::ReadingComprehension
            | QuestionType::Dropdown
            | QuestionType::Survey
            | QuestionType::Poll
            | QuestionType::OpenEnded
            | QuestionType::MathInput => ValueKind::Text,
            QuestionType::Matching => ValueKind::ArrayMatch,
            QuestionType::DragNDrop => ValueKind::ArrayDragAndDrop,
            QuestionType::ImageHotspot => ValueKind::Coordinates,
            QuestionType::Classify => ValueKind::ArrayCategorize,
            QuestionType::Reorder => ValueKind::ArrayReorder,
            QuestionType::ImageTagging => ValueKind::ArrayLabeling,
            QuestionType::Draw => ValueKind::Canvas,
            QuestionType::VideoResponse | QuestionType::AudioResponse => ValueKind::Media,
            QuestionType::WordCloud => ValueKind::ArrayWordCloud,
            QuestionType::GraphPlotting => ValueKind::ArrayGraphing,
        }
    }

    /// Whether this question derives correctness from nested sub-questions.
    pub fn is_composite(&self) -> bool {
        matches!(self.payload, QuestionPayload::ReadingComprehension { .. })
    }

    /// Owned sub-questions, empty for non-composite questions.
    pub fn sub_questions(&self) -> &[Question] {
        match &self.payload {
            QuestionPayload::ReadingComprehension { sub_questions, .. } => sub_questions,
            _ => &[],
        }
    }

    /// Score weight of this question. Defaults to 1.
    pub fn points(&self) -> f64 {
        self.metadata
            .as_ref()
            .and_then(|m| m.points)
            .unwrap_or(1.0)
    }

    pub fn hint(&self) -> Option<&LocalizedText> {
        self.metadata.as_ref().and_then(|m| m.hint.as_ref())
    }

    /// Depth of the composite tree rooted at this question (1 for a leaf).
    pub fn nesting_depth(&self) -> usize {
        1 + self
            .sub_questions()
            .iter()
            .map(Question::nesting_depth)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("id", &self.id)
            .field("type", &self.question_type())
            .field("text", &self.text)
            .field("correct_answer", &self.correct_answer)
            .field("metadata", &self.metadata)
            .field("validator", &self.validator.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl PartialEq for Question {
    /// Structural equality; custom validators are compared by presence only.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.text == other.text
            && self.payload == other.payload
            && self.correct_answer == other.correct_answer
            && self.metadata == other.metadata
            && self.validator.is_some() == other.validator.is_some()
    }
}

/// A named, fully materialized set of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Maximum attainable score: the summed weight of top-level questions
    /// that are scorable (objective, or carrying a custom validator).
    pub fn total_points(&self) -> f64 {
        self.questions
            .iter()
            .filter(|q| q.answer_type() == AnswerType::Objective || q.validator.is_some())
            .map(Question::points)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Point;

    fn multi_choice(id: &str) -> Question {
        Question::new(
            id,
            "Pick one",
            QuestionPayload::MultiChoice {
                options: vec![
                    QuestionOption {
                        id: "a".into(),
                        value: OptionValue::Text("A".into()),
                        label: None,
                    },
                    QuestionOption {
                        id: "b".into(),
                        value: OptionValue::Text("B".into()),
                        label: None,
                    },
                ],
            },
        )
        .with_correct_answer(AnswerValue::text("B"))
    }

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::DragNDrop.to_string(), "DRAG_N_DROP");
        assert_eq!(
            "DRAG_N_DROP".parse::<QuestionType>().unwrap(),
            QuestionType::DragNDrop
        );
        assert_eq!(
            "READING_COMPREHENSION".parse::<QuestionType>().unwrap(),
            QuestionType::ReadingComprehension
        );
        assert!("ESSAY".parse::<QuestionType>().is_err());
    }

    #[test]
    fn question_wire_format_has_type_tag() {
        let q = multi_choice("q1");
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "MULTI_CHOICE");
        assert_eq!(json["correct_answer"]["type"], "text");

        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn hotspot_expected_kind_is_coordinates() {
        let q = Question::new(
            "h1",
            "Click the capital",
            QuestionPayload::ImageHotspot {
                image_url: "map.png".into(),
                hotspots: vec![],
            },
        )
        .with_correct_answer(AnswerValue::Coordinates(Point::new(10.0, 20.0)));
        assert_eq!(q.expected_kind(), ValueKind::Coordinates);
        assert_eq!(q.answer_type(), AnswerType::Objective);
    }

    #[test]
    fn non_evaluated_partition() {
        let q = Question::new("d1", "Draw a cat", QuestionPayload::Draw);
        assert_eq!(q.answer_type(), AnswerType::NonEvaluated);
        assert_eq!(q.expected_kind(), ValueKind::Canvas);
    }

    #[test]
    fn composite_owns_sub_questions() {
        let passage = Question::new(
            "p1",
            "Read and answer",
            QuestionPayload::ReadingComprehension {
                passage: "Once upon a time...".into(),
                sub_questions: vec![multi_choice("p1-a"), multi_choice("p1-b")],
            },
        );
        assert!(passage.is_composite());
        assert_eq!(passage.sub_questions().len(), 2);
        assert_eq!(passage.nesting_depth(), 2);

        let leaf = multi_choice("q1");
        assert_eq!(leaf.nesting_depth(), 1);
        assert!(leaf.sub_questions().is_empty());
    }

    #[test]
    fn points_default_to_one() {
        let q = multi_choice("q1");
        assert!((q.points() - 1.0).abs() < f64::EPSILON);

        let weighted = multi_choice("q2").with_metadata(QuestionMetadata {
            points: Some(2.5),
            ..Default::default()
        });
        assert!((weighted.points() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn quiz_total_points_skips_unscorable() {
        let quiz = Quiz {
            id: "quiz".into(),
            name: "Quiz".into(),
            description: String::new(),
            questions: vec![
                multi_choice("q1"),
                Question::new("q2", "Thoughts?", QuestionPayload::OpenEnded { max_length: 500 }),
            ],
        };
        assert!((quiz.total_points() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn metadata_roundtrip() {
        let q = multi_choice("q1").with_metadata(QuestionMetadata {
            difficulty: Some(DifficultyLevel::Hard),
            points: Some(3.0),
            time_limit_secs: Some(30),
            tags: vec!["geography".into()],
            hint: Some("Starts with B".into()),
        });
        let json = serde_json::to_string(&q).unwrap();
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata, q.metadata);
        assert_eq!(back.hint().and_then(|h| h.resolve("en")), Some("Starts with B"));
    }
}
