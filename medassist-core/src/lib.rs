//! # medassist-core
//!
//! Shared kernel for the MedAssist retrieval-augmented QA core.
//!
//! This crate holds everything the other member crates agree on:
//!
//! - [`AssistError`] / [`ErrorKind`] — the full failure taxonomy
//! - [`AppConfig`] — the single validated configuration constructed at startup
//! - [`ChatModel`] — the chat-completion provider boundary
//! - [`Answer`] / [`Citation`] — the result types handed back to the caller
//!
//! It deliberately has no I/O of its own.

pub mod answer;
pub mod config;
pub mod error;
pub mod model;

pub use answer::{Answer, Citation};
pub use config::{
    AppConfig, ChunkingConfig, EmbeddingConfig, GenerationConfig, GuardConfig, RetrievalConfig,
};
pub use error::{AssistError, ErrorKind, Result};
pub use model::{ChatModel, Completion, CompletionRequest, Message, Role};
