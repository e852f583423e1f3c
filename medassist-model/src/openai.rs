//! OpenAI-compatible chat-completion client.

use async_trait::async_trait;
use medassist_core::{
    AssistError, ChatModel, Completion, CompletionRequest, GenerationConfig, Result, Role,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// A [`ChatModel`] backed by an OpenAI-compatible `/v1/chat/completions`
/// endpoint, non-streaming.
///
/// # Example
///
/// ```rust,ignore
/// use medassist_model::OpenAiChatModel;
///
/// let model = OpenAiChatModel::new(api_key, &config.generation)?;
/// let completion = model.complete(request).await?;
/// ```
pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: std::time::Duration,
}

impl OpenAiChatModel {
    /// Create a new client from an API key and the generation configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::Generation`] if the key is empty or the HTTP
    /// client cannot be constructed.
    pub fn new(api_key: impl Into<String>, config: &GenerationConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AssistError::Generation {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build().map_err(|e| {
            AssistError::Generation {
                provider: "OpenAI".into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/v1/chat/completions", config.base_url.trim_end_matches('/')),
            timeout: config.timeout,
        })
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        debug!(
            provider = "OpenAI",
            model = %self.model,
            message_count = request.messages.len(),
            max_tokens = request.max_tokens,
            "chat completion request"
        );

        let body = ChatRequest {
            model: &self.model,
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage { role: role_str(m.role), content: &m.content })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistError::Timeout {
                        operation: "chat".into(),
                        elapsed_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    error!(provider = "OpenAI", error = %e, "chat request failed");
                    AssistError::Generation {
                        provider: "OpenAI".into(),
                        message: format!("request failed: {e}"),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "OpenAI", %status, "chat API error");
            return Err(AssistError::Generation {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse chat response");
            AssistError::Generation {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let choice = chat_response.choices.into_iter().next().ok_or_else(|| {
            AssistError::Generation {
                provider: "OpenAI".into(),
                message: "API returned no choices".into(),
            }
        })?;

        let truncated = choice.finish_reason.as_deref() == Some("length");
        if truncated {
            warn!(provider = "OpenAI", model = %self.model, "completion was length-truncated");
        }

        Ok(Completion { text: choice.message.content.unwrap_or_default(), truncated })
    }

    fn name(&self) -> &str {
        &self.model
    }
}
