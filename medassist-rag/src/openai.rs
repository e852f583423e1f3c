//! OpenAI-compatible embedding provider.

use async_trait::async_trait;
use medassist_core::{AssistError, EmbeddingConfig, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// An [`EmbeddingProvider`] backed by an OpenAI-compatible `/v1/embeddings`
/// endpoint.
///
/// Inputs longer than the configured `max_input_chars` fail with
/// [`AssistError::InputTooLarge`] before any network call — the provider
/// never silently truncates. Batch requests send all texts in one call.
///
/// # Example
///
/// ```rust,ignore
/// use medassist_rag::OpenAiEmbedder;
///
/// let embedder = OpenAiEmbedder::new(api_key, &config.embedding)?;
/// let vector = embedder.embed("hello world").await?;
/// ```
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    dimensions: usize,
    max_input_chars: usize,
    timeout: std::time::Duration,
}

impl OpenAiEmbedder {
    /// Create a new provider from an API key and the embedding configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::Embedding`] if the key is empty or the HTTP
    /// client cannot be constructed.
    pub fn new(api_key: impl Into<String>, config: &EmbeddingConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AssistError::Embedding {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build().map_err(|e| {
            AssistError::Embedding {
                provider: "OpenAI".into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/v1/embeddings", config.base_url.trim_end_matches('/')),
            dimensions: DEFAULT_DIMENSIONS,
            max_input_chars: config.max_input_chars,
            timeout: config.timeout,
        })
    }

    /// Override the reported dimensionality (model-dependent).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn request_error(timeout: std::time::Duration, e: reqwest::Error) -> AssistError {
    if e.is_timeout() {
        AssistError::Timeout {
            operation: "embed".into(),
            elapsed_ms: timeout.as_millis() as u64,
        }
    } else {
        AssistError::Embedding { provider: "OpenAI".into(), message: format!("request failed: {e}") }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| AssistError::Embedding {
            provider: "OpenAI".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        for text in texts {
            let chars = text.chars().count();
            if chars > self.max_input_chars {
                return Err(AssistError::InputTooLarge { chars, max: self.max_input_chars });
            }
        }

        debug!(provider = "OpenAI", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbeddingRequest { model: &self.model, input: texts.to_vec() };
        let timeout = self.timeout;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "embedding request failed");
                request_error(timeout, e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "OpenAI", %status, "embeddings API error");
            return Err(AssistError::Embedding {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse embeddings response");
            AssistError::Embedding {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if embedding_response.data.len() != texts.len() {
            return Err(AssistError::Embedding {
                provider: "OpenAI".into(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    embedding_response.data.len(),
                    texts.len()
                ),
            });
        }

        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
