//! # medassist-model
//!
//! Chat-completion providers implementing [`medassist_core::ChatModel`]:
//!
//! - [`OpenAiChatModel`] — OpenAI-compatible HTTP client (OpenAI, Azure
//!   front-ends, Ollama, vLLM, …), non-streaming
//! - [`MockChatModel`] — scripted completions with call recording for tests

pub mod mock;
pub mod openai;

pub use mock::MockChatModel;
pub use openai::OpenAiChatModel;
