//! A scripted chat model for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use medassist_core::{AssistError, ChatModel, Completion, CompletionRequest, Result};

/// A [`ChatModel`] that returns scripted completions and records call counts,
/// so tests can assert that no model call happened on guarded paths.
#[derive(Debug, Default)]
pub struct MockChatModel {
    responses: Mutex<Vec<String>>,
    fallback: String,
    fail: bool,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockChatModel {
    /// Answer every call with the same text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { fallback: text.into(), ..Self::default() }
    }

    /// Answer calls with the given texts in order, then fall back to the
    /// last one.
    pub fn with_responses(texts: Vec<String>) -> Self {
        let fallback = texts.last().cloned().unwrap_or_default();
        Self { responses: Mutex::new(texts), fallback, ..Self::default() }
    }

    /// Fail every call with a transient generation error.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// How many completion calls this mock has served (including failures).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, for prompt-content assertions.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request);
        }

        if self.fail {
            return Err(AssistError::Generation {
                provider: "mock".into(),
                message: "scripted failure".into(),
            });
        }

        let text = match self.responses.lock() {
            Ok(mut responses) if !responses.is_empty() => responses.remove(0),
            _ => self.fallback.clone(),
        };
        Ok(Completion { text, truncated: false })
    }

    fn name(&self) -> &str {
        "mock-chat-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medassist_core::Message;

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![Message::user("hello")],
            max_tokens: 64,
            temperature: 0.2,
        }
    }

    #[tokio::test]
    async fn scripted_responses_are_served_in_order() {
        let model = MockChatModel::with_responses(vec!["first".into(), "second".into()]);
        assert_eq!(model.complete(request()).await.unwrap().text, "first");
        assert_eq!(model.complete(request()).await.unwrap().text, "second");
        // Exhausted scripts fall back to the last response.
        assert_eq!(model.complete(request()).await.unwrap().text, "second");
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_mock_returns_a_retryable_error() {
        let model = MockChatModel::failing();
        let err = model.complete(request()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(model.call_count(), 1);
    }
}
