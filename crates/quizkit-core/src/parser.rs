//! JSON quiz definition parser.
//!
//! Loads quizzes from JSON files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{AnswerType, Question, QuestionPayload, Quiz};

/// Parse a single JSON file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a JSON string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse quiz JSON: {}", source_path.display()))
}

/// Recursively load all `.json` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz for common content issues.
///
/// Warnings are advisory; a quiz that only produces warnings still loads
/// and runs. Hard structural failures (malformed JSON, unknown question
/// types) are rejected at parse time instead.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz has no questions".into(),
        });
    }

    // Check for duplicate question IDs, sub-questions included
    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        check_duplicate_ids(question, &mut seen_ids, &mut warnings);
    }

    for question in &quiz.questions {
        validate_question(question, &mut warnings);
    }

    warnings
}

fn check_duplicate_ids<'a>(
    question: &'a Question,
    seen: &mut HashSet<&'a str>,
    warnings: &mut Vec<ValidationWarning>,
) {
    if !seen.insert(&question.id) {
        warnings.push(ValidationWarning {
            question_id: Some(question.id.clone()),
            message: format!("duplicate question ID: {}", question.id),
        });
    }
    for sub in question.sub_questions() {
        check_duplicate_ids(sub, seen, warnings);
    }
}

fn validate_question(question: &Question, warnings: &mut Vec<ValidationWarning>) {
    if question.text.resolve("").map_or(true, str::is_empty) {
        warnings.push(ValidationWarning {
            question_id: Some(question.id.clone()),
            message: "question has empty text".into(),
        });
    }

    if question.is_composite() {
        let depth_limit = crate::validator::ValidationConfig::default().max_composite_depth;
        if question.nesting_depth() > depth_limit {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("composite nesting exceeds depth limit of {depth_limit}"),
            });
        }
        if question.sub_questions().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "reading comprehension question has no sub-questions".into(),
            });
        }
        if question.correct_answer.is_some() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "correct_answer on a composite question is ignored".into(),
            });
        }
        for sub in question.sub_questions() {
            validate_question(sub, warnings);
        }
        return;
    }

    match &question.correct_answer {
        None => {
            if question.answer_type() == AnswerType::Objective {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!(
                        "{} question has no correct_answer and cannot be scored",
                        question.question_type()
                    ),
                });
            }
        }
        Some(answer) => {
            if answer.kind() != question.expected_kind() {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!(
                        "correct_answer is {} but {} expects {}",
                        answer.kind(),
                        question.question_type(),
                        question.expected_kind()
                    ),
                });
            }
        }
    }

    // A multi-choice key that matches none of the options can never be
    // answered correctly.
    if let QuestionPayload::MultiChoice { options } = &question.payload {
        if let Some(crate::value::AnswerValue::Text(key)) = &question.correct_answer {
            let known = options.iter().any(|o| {
                o.id == *key
                    || matches!(&o.value, crate::value::OptionValue::Text(t) if t == key)
            });
            if !known {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!("correct_answer {key:?} matches no option"),
                });
            }
        }
    }

    // Sequencing questions with fewer than two elements have nothing to
    // reorder or pair.
    let degenerate = match &question.payload {
        QuestionPayload::Reorder { items } => items.len() < 2,
        QuestionPayload::Matching { pairs } => pairs.len() < 2,
        _ => false,
    };
    if degenerate {
        warnings.push(ValidationWarning {
            question_id: Some(question.id.clone()),
            message: format!(
                "{} question needs at least two elements",
                question.question_type()
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_JSON: &str = r#"
{
  "id": "geo-1",
  "name": "Geography Basics",
  "description": "Capitals and maps",
  "questions": [
    {
      "id": "q1",
      "text": "What is the capital of France?",
      "type": "MULTI_CHOICE",
      "options": [
        { "id": "a", "value": { "type": "text", "value": "Paris" } },
        { "id": "b", "value": { "type": "text", "value": "Lyon" } }
      ],
      "correct_answer": { "type": "text", "value": "Paris" }
    },
    {
      "id": "q2",
      "text": "Read the passage and answer.",
      "type": "READING_COMPREHENSION",
      "passage": "The Seine flows through Paris.",
      "subQuestions": [
        {
          "id": "q2-a",
          "text": "Which river is mentioned?",
          "type": "MULTI_CHOICE",
          "options": [
            { "id": "a", "value": { "type": "text", "value": "Seine" } },
            { "id": "b", "value": { "type": "text", "value": "Loire" } }
          ],
          "correct_answer": { "type": "text", "value": "Seine" }
        }
      ]
    },
    {
      "id": "q3",
      "text": "Any feedback on this quiz?",
      "type": "OPEN_ENDED",
      "maxLength": 500
    }
  ]
}
"#;

    #[test]
    fn parse_valid_json() {
        let quiz = parse_quiz_str(VALID_JSON, &PathBuf::from("test.json")).unwrap();
        assert_eq!(quiz.id, "geo-1");
        assert_eq!(quiz.name, "Geography Basics");
        assert_eq!(quiz.questions.len(), 3);
        assert!(quiz.questions[1].is_composite());
        assert_eq!(quiz.questions[1].sub_questions().len(), 1);
        assert!(validate_quiz(&quiz).is_empty());
    }

    #[test]
    fn parse_malformed_json() {
        let bad = "{ not valid json ]";
        let result = parse_quiz_str(bad, &PathBuf::from("bad.json"));
        assert!(result.is_err());
    }

    #[test]
    fn parse_unknown_question_type_fails() {
        let json = r#"
{
  "id": "x",
  "name": "X",
  "questions": [
    { "id": "q1", "text": "?", "type": "ESSAY" }
  ]
}
"#;
        assert!(parse_quiz_str(json, &PathBuf::from("x.json")).is_err());
    }

    #[test]
    fn validate_duplicate_ids_across_nesting() {
        let json = r#"
{
  "id": "dupes",
  "name": "Dupes",
  "questions": [
    {
      "id": "q1",
      "text": "Pick",
      "type": "MULTI_CHOICE",
      "options": [],
      "correct_answer": { "type": "text", "value": "A" }
    },
    {
      "id": "p1",
      "text": "Passage",
      "type": "READING_COMPREHENSION",
      "passage": "...",
      "subQuestions": [
        {
          "id": "q1",
          "text": "Pick again",
          "type": "MULTI_CHOICE",
          "options": [],
          "correct_answer": { "type": "text", "value": "A" }
        }
      ]
    }
  ]
}
"#;
        let quiz = parse_quiz_str(json, &PathBuf::from("dupes.json")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_objective_without_answer_key() {
        let json = r#"
{
  "id": "no-key",
  "name": "No Key",
  "questions": [
    {
      "id": "q1",
      "text": "Pick",
      "type": "DROPDOWN",
      "options": [
        { "id": "a", "value": { "type": "text", "value": "A" } }
      ]
    }
  ]
}
"#;
        let quiz = parse_quiz_str(json, &PathBuf::from("no-key.json")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("no correct_answer")));
    }

    #[test]
    fn validate_answer_kind_mismatch() {
        let json = r#"
{
  "id": "mismatch",
  "name": "Mismatch",
  "questions": [
    {
      "id": "q1",
      "text": "Click the capital",
      "type": "IMAGE_HOTSPOT",
      "imageUrl": "map.png",
      "hotspots": [],
      "correct_answer": { "type": "text", "value": "Paris" }
    }
  ]
}
"#;
        let quiz = parse_quiz_str(json, &PathBuf::from("mismatch.json")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("expects")));
    }

    #[test]
    fn validate_multi_choice_key_not_among_options() {
        let json = r#"
{
  "id": "stray-key",
  "name": "Stray Key",
  "questions": [
    {
      "id": "q1",
      "text": "Pick",
      "type": "MULTI_CHOICE",
      "options": [
        { "id": "a", "value": { "type": "text", "value": "A" } }
      ],
      "correct_answer": { "type": "text", "value": "Z" }
    }
  ]
}
"#;
        let quiz = parse_quiz_str(json, &PathBuf::from("stray.json")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("no option")));
    }

    #[test]
    fn validate_empty_text_and_degenerate_reorder() {
        let json = r#"
{
  "id": "thin",
  "name": "Thin",
  "questions": [
    {
      "id": "q1",
      "text": "",
      "type": "REORDER",
      "items": [
        { "id": "a", "value": { "type": "text", "value": "only one" } }
      ],
      "correct_answer": { "type": "array-reorder", "value": ["a"] }
    }
  ]
}
"#;
        let quiz = parse_quiz_str(json, &PathBuf::from("thin.json")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("empty text")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("at least two elements")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("quiz.json");
        std::fs::write(&file_path, VALID_JSON).unwrap();
        // Non-JSON and malformed files are skipped, not fatal.
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].id, "geo-1");
    }
}
