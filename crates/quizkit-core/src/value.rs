//! Answer and option value model.
//!
//! Every question variant exchanges answers through the same tagged
//! `AnswerValue` union; the discriminant (`ValueKind`) is what the engine
//! compares when deciding whether a submission even has the right shape
//! for a question.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2D point, used by hotspot, labeling, and graphing answers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An element of a reorder sequence. The wire format allows either a
/// string id or a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReorderKey {
    Text(String),
    Number(f64),
}

impl From<&str> for ReorderKey {
    fn from(s: &str) -> Self {
        ReorderKey::Text(s.to_string())
    }
}

/// One item placed on one target (drag-and-drop).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub item_id: String,
    pub target_id: String,
}

/// One item assigned to one category (classify).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categorization {
    pub item_id: String,
    pub category_id: String,
}

/// One label placed at a position on an image (tagging).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPlacement {
    pub label_id: String,
    pub position: Point,
}

/// One left/right pairing (matching).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchEntry {
    pub left: String,
    pub right: String,
}

/// A submitted or expected answer value, tagged by shape.
///
/// Wire format is `{"type": "...", "value": ...}` with kebab-case tags,
/// e.g. `{"type": "array-match", "value": [{"left": "a", "right": "1"}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Coordinates(Point),
    /// Serialized canvas contents (draw questions).
    Canvas(String),
    /// Reference to an uploaded media blob (video/audio responses).
    Media(String),
    ArrayReorder(Vec<ReorderKey>),
    ArrayDragAndDrop(Vec<Placement>),
    ArrayCategorize(Vec<Categorization>),
    ArrayLabeling(Vec<LabelPlacement>),
    ArrayMatch(Vec<MatchEntry>),
    ArrayGraphing(Vec<Point>),
    ArrayWordCloud(Vec<String>),
}

impl AnswerValue {
    /// The shape discriminant of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            AnswerValue::Text(_) => ValueKind::Text,
            AnswerValue::Number(_) => ValueKind::Number,
            AnswerValue::Boolean(_) => ValueKind::Boolean,
            AnswerValue::Coordinates(_) => ValueKind::Coordinates,
            AnswerValue::Canvas(_) => ValueKind::Canvas,
            AnswerValue::Media(_) => ValueKind::Media,
            AnswerValue::ArrayReorder(_) => ValueKind::ArrayReorder,
            AnswerValue::ArrayDragAndDrop(_) => ValueKind::ArrayDragAndDrop,
            AnswerValue::ArrayCategorize(_) => ValueKind::ArrayCategorize,
            AnswerValue::ArrayLabeling(_) => ValueKind::ArrayLabeling,
            AnswerValue::ArrayMatch(_) => ValueKind::ArrayMatch,
            AnswerValue::ArrayGraphing(_) => ValueKind::ArrayGraphing,
            AnswerValue::ArrayWordCloud(_) => ValueKind::ArrayWordCloud,
        }
    }

    /// Convenience constructor for plain text answers.
    pub fn text(s: impl Into<String>) -> Self {
        AnswerValue::Text(s.into())
    }
}

/// Discriminant-only view of [`AnswerValue`], used for type-mismatch checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    Text,
    Number,
    Boolean,
    Coordinates,
    Canvas,
    Media,
    ArrayReorder,
    ArrayDragAndDrop,
    ArrayCategorize,
    ArrayLabeling,
    ArrayMatch,
    ArrayGraphing,
    ArrayWordCloud,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Coordinates => "coordinates",
            ValueKind::Canvas => "canvas",
            ValueKind::Media => "media",
            ValueKind::ArrayReorder => "array-reorder",
            ValueKind::ArrayDragAndDrop => "array-drag-and-drop",
            ValueKind::ArrayCategorize => "array-categorize",
            ValueKind::ArrayLabeling => "array-labeling",
            ValueKind::ArrayMatch => "array-match",
            ValueKind::ArrayGraphing => "array-graphing",
            ValueKind::ArrayWordCloud => "array-word-cloud",
        };
        write!(f, "{s}")
    }
}

/// The narrower value union allowed inside a [`crate::model::QuestionOption`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum OptionValue {
    Text(String),
    Number(f64),
    Coordinates(Point),
}

/// Display text that is either plain or keyed by language code.
///
/// Resolution strategy belongs to the caller; `resolve` only offers the
/// obvious lookup with a deterministic any-language fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    ByLanguage(BTreeMap<String, String>),
}

impl LocalizedText {
    pub fn plain(s: impl Into<String>) -> Self {
        LocalizedText::Plain(s.into())
    }

    /// Resolve for a language code, falling back to the first available
    /// translation when the requested one is missing.
    pub fn resolve(&self, lang: &str) -> Option<&str> {
        match self {
            LocalizedText::Plain(s) => Some(s.as_str()),
            LocalizedText::ByLanguage(map) => map
                .get(lang)
                .or_else(|| map.values().next())
                .map(String::as_str),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(s: &str) -> Self {
        LocalizedText::Plain(s.to_string())
    }
}

impl From<String> for LocalizedText {
    fn from(s: String) -> Self {
        LocalizedText::Plain(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_value_wire_format() {
        let v = AnswerValue::text("B");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "value": "B"}));

        let v = AnswerValue::ArrayMatch(vec![MatchEntry {
            left: "a".into(),
            right: "1".into(),
        }]);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "array-match",
                "value": [{"left": "a", "right": "1"}]
            })
        );
    }

    #[test]
    fn answer_value_roundtrip() {
        let v = AnswerValue::ArrayLabeling(vec![LabelPlacement {
            label_id: "l1".into(),
            position: Point::new(1.0, 2.0),
        }]);
        let json = serde_json::to_string(&v).unwrap();
        let back: AnswerValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert_eq!(back.kind(), ValueKind::ArrayLabeling);
    }

    #[test]
    fn reorder_key_accepts_strings_and_numbers() {
        let v: AnswerValue =
            serde_json::from_str(r#"{"type": "array-reorder", "value": ["a", 2, "c"]}"#).unwrap();
        match v {
            AnswerValue::ArrayReorder(keys) => {
                assert_eq!(keys[0], ReorderKey::from("a"));
                assert_eq!(keys[1], ReorderKey::Number(2.0));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn kind_display_matches_wire_tag() {
        assert_eq!(ValueKind::ArrayDragAndDrop.to_string(), "array-drag-and-drop");
        assert_eq!(ValueKind::Coordinates.to_string(), "coordinates");
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn localized_text_resolution() {
        let plain = LocalizedText::plain("hello");
        assert_eq!(plain.resolve("de"), Some("hello"));

        let mut map = BTreeMap::new();
        map.insert("en".to_string(), "hello".to_string());
        map.insert("fr".to_string(), "bonjour".to_string());
        let localized = LocalizedText::ByLanguage(map);
        assert_eq!(localized.resolve("fr"), Some("bonjour"));
        // Unknown language falls back to the first entry.
        assert_eq!(localized.resolve("de"), Some("hello"));
    }

    #[test]
    fn localized_text_untagged_parse() {
        let plain: LocalizedText = serde_json::from_str(r#""just text""#).unwrap();
        assert_eq!(plain, LocalizedText::plain("just text"));

        let map: LocalizedText = serde_json::from_str(r#"{"en": "hi"}"#).unwrap();
        assert_eq!(map.resolve("en"), Some("hi"));
    }
}
