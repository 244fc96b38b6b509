//! Mock loader for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizkit_core::model::Question;
use quizkit_core::traits::QuestionLoader;

/// One recorded page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub start_index: usize,
    pub count: usize,
}

/// A mock question loader for testing engine paging without a real backend.
///
/// Records every page request and can be configured to advertise a larger
/// total than it can serve, or to fail outright.
pub struct MockLoader {
    questions: Vec<Question>,
    /// Total reported to the engine; defaults to the real count.
    advertised_total: usize,
    /// When set, every fetch fails with this message.
    failure: Option<String>,
    /// Number of page fetches made.
    call_count: AtomicU32,
    /// Last page request received.
    last_request: Mutex<Option<LoadRequest>>,
}

impl MockLoader {
    pub fn new(questions: Vec<Question>) -> Self {
        let advertised_total = questions.len();
        Self {
            questions,
            advertised_total,
            failure: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Advertise `total` regardless of how many questions are available.
    pub fn with_advertised_total(mut self, total: usize) -> Self {
        self.advertised_total = total;
        self
    }

    /// Make every fetch fail with `message`.
    pub fn failing(total: usize, message: &str) -> Self {
        Self {
            questions: Vec::new(),
            advertised_total: total,
            failure: Some(message.to_string()),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of page fetches made against this loader.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last page request made against this loader.
    pub fn last_request(&self) -> Option<LoadRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionLoader for MockLoader {
    fn total_questions(&self) -> usize {
        self.advertised_total
    }

    async fn load_questions(&self, start_index: usize, count: usize) -> anyhow::Result<Vec<Question>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(LoadRequest { start_index, count });

        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }

        let end = (start_index + count).min(self.questions.len());
        if start_index >= self.questions.len() {
            anyhow::bail!(crate::LoaderError::OutOfRange {
                start: start_index,
                count,
                total: self.questions.len(),
            });
        }
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
    async fn records_requests() {
        let loader = MockLoader::new(questions(30));
        loader.load_questions(10, 10).await.unwrap();

        assert_eq!(loader.call_count(), 1);
        assert_eq!(
            loader.last_request(),
            Some(LoadRequest {
                start_index: 10,
                count: 10
            })
        );
    }

    #[tokio::test]
    async fn failing_loader_fails_every_fetch() {
        let loader = MockLoader::failing(50, "backend unavailable");
        assert_eq!(loader.total_questions(), 50);
        let err = loader.load_questions(0, 10).await.unwrap_err();
        assert!(err.to_string().contains("backend unavailable"));
        assert_eq!(loader.call_count(), 1);
    }

    #[tokio::test]
    async fn advertised_total_can_exceed_served() {
        let loader = MockLoader::new(questions(10)).with_advertised_total(100);
        assert_eq!(loader.total_questions(), 100);
        assert!(loader.load_questions(10, 10).await.is_err());
    }
}
