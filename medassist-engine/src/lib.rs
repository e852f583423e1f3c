//! # medassist-engine
//!
//! Orchestration for the MedAssist retrieval-augmented QA core: prompt
//! assembly, answer generation with context-derived citations, and the
//! [`Engine`] facade exposing `handle_query`, `rebuild_index`, `load_index`
//! and `stats` to the serving layer.

pub mod generator;
pub mod prompt;
pub mod service;

pub use generator::AnswerGenerator;
pub use prompt::INSUFFICIENT_CONTEXT_ANSWER;
pub use service::{Engine, EngineBuilder, EngineStats, IndexStats};
