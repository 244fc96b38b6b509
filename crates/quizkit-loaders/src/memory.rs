//! In-memory question source.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use quizkit_core::model::{Question, Quiz};
use quizkit_core::parser;
use quizkit_core::traits::QuestionLoader;

/// A loader over an already materialized question list.
///
/// Useful for serving a parsed quiz file through the same paged interface
/// as a large backend, so callers exercise one code path.
pub struct InMemoryLoader {
    questions: Vec<Question>,
}

impl InMemoryLoader {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn from_quiz(quiz: Quiz) -> Self {
        Self::new(quiz.questions)
    }

    /// Load a quiz definition file and serve its questions.
    pub fn from_file(path: &Path) -> Result<Self> {
        let quiz = parser::parse_quiz(path)?;
        Ok(Self::from_quiz(quiz))
    }
}

#[async_trait]
impl QuestionLoader for InMemoryLoader {
    fn total_questions(&self) -> usize {
        self.questions.len()
    }

    async fn load_questions(&self, start_index: usize, count: usize) -> Result<Vec<Question>> {
        if start_index >= self.questions.len() {
            anyhow::bail!(crate::LoaderError::OutOfRange {
                start: start_index,
                count,
                total: self.questions.len(),
            });
        }
        let end = (start_index + count).min(self.questions.len());
        Ok(self.questions[start_index..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizkit_core::model::QuestionPayload;
    use quizkit_core::value::AnswerValue;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::new(
                    format!("q{i}"),
                    format!("Question {i}"),
                    QuestionPayload::Dropdown { options: vec![] },
                )
                .with_correct_answer(AnswerValue::text("A"))
            })
            .collect()
    }

    #[tokio::test]
    async fn serves_slices() {
        let loader = InMemoryLoader::new(questions(25));
        assert_eq!(loader.total_questions(), 25);

        let page = loader.load_questions(10, 10).await.unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].id, "q10");

        // Final page is short.
        let page = loader.load_questions(20, 10).await.unwrap();
        assert_eq!(page.len(), 5);
    }

    #[tokio::test]
    async fn out_of_range_is_an_error() {
        let loader = InMemoryLoader::new(questions(5));
        assert!(loader.load_questions(5, 10).await.is_err());
    }
}
