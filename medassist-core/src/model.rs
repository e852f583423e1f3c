//! The chat-completion provider boundary.
//!
//! [`ChatModel`] is the single seam between the core and the language-model
//! provider. Implementations live in `medassist-model`; tests substitute a
//! mock. The core calls it exactly once per answered query, non-streaming,
//! with a bounded output length and a fixed low temperature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The fixed system instruction.
    System,
    /// The end user's query.
    User,
    /// A model response (unused in requests today; kept for completeness).
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who is speaking.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl Message {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// A chat-completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The conversation to complete (system instruction plus user query).
    pub messages: Vec<Message>,
    /// Upper bound on completion length, in tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// The model's completion.
#[derive(Debug, Clone)]
pub struct Completion {
    /// The completion text.
    pub text: String,
    /// Whether the provider reported the output as length-truncated.
    pub truncated: bool,
}

/// A chat-completion provider.
///
/// # Example
///
/// ```rust,ignore
/// use medassist_core::{ChatModel, CompletionRequest, Message};
///
/// let request = CompletionRequest {
///     messages: vec![Message::system("You are helpful."), Message::user("Hi")],
///     max_tokens: 512,
///     temperature: 0.2,
/// };
/// let completion = model.complete(request).await?;
/// ```
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run a single non-streaming completion.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;

    /// The provider/model name, for logs and error messages.
    fn name(&self) -> &str;
}
