//! Pre-flight input limits on the HTTP embedding provider.
//!
//! The base URL points at an unroutable local port, so any attempted request
//! would fail with a transport error rather than the expected limit error —
//! the assertions therefore also prove that no request was made.

use medassist_core::{AssistError, EmbeddingConfig};
use medassist_rag::{EmbeddingProvider, OpenAiEmbedder};

fn config(max_input_chars: usize) -> EmbeddingConfig {
    EmbeddingConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        max_input_chars,
        ..EmbeddingConfig::default()
    }
}

#[tokio::test]
async fn oversized_input_fails_before_any_request() {
    let embedder = OpenAiEmbedder::new("test-key", &config(16)).unwrap();
    let err = embedder.embed(&"x".repeat(17)).await.unwrap_err();
    assert!(matches!(err, AssistError::InputTooLarge { chars: 17, max: 16 }));
}

#[tokio::test]
async fn one_oversized_batch_member_rejects_the_whole_batch() {
    let embedder = OpenAiEmbedder::new("test-key", &config(16)).unwrap();
    let long = "y".repeat(32);
    let err = embedder.embed_batch(&["short", long.as_str()]).await.unwrap_err();
    assert!(matches!(err, AssistError::InputTooLarge { chars: 32, max: 16 }));
}

#[tokio::test]
async fn empty_batch_returns_without_a_request() {
    let embedder = OpenAiEmbedder::new("test-key", &config(16)).unwrap();
    assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
}
