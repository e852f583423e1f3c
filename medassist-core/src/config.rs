//! Application configuration.
//!
//! One validated [`AppConfig`] is constructed at process start and passed by
//! reference to each component's constructor. Validation failures are
//! reported at startup, not at first use. Secrets (API keys) are never stored
//! here; the binary reads them and hands them to provider constructors.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AssistError, Result};

/// Chunking parameters for document ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 800, chunk_overlap: 100 }
    }
}

/// Retrieval parameters for query-time search.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    /// Number of top results to fetch from the index.
    pub top_k: usize,
    /// Optional minimum similarity score; results below it are dropped.
    pub score_threshold: Option<f32>,
    /// Deadline for the query-embedding call.
    pub embed_timeout: Duration,
    /// Deadline for the index scan.
    pub search_timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: None,
            embed_timeout: Duration::from_secs(30),
            search_timeout: Duration::from_secs(10),
        }
    }
}

/// Guard-layer parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardConfig {
    /// Maximum query length in characters after sanitisation.
    pub max_query_chars: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        // Tokens are ~4 chars each; 500 tokens ≈ 2000 chars.
        Self { max_query_chars: 2000 }
    }
}

/// Embedding-provider parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    /// Embedding model name.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Maximum input length in characters per embedded text.
    pub max_input_chars: usize,
    /// Number of chunks embedded per batch request during ingestion.
    pub batch_size: usize,
    /// Deadline for each embedding request.
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_input_chars: 8000,
            batch_size: 64,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Chat-completion parameters for answer generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Chat model name.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Upper bound on completion length.
    pub max_tokens: u32,
    /// Sampling temperature; kept low to favour determinism over creativity.
    pub temperature: f32,
    /// Deadline for the completion call.
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 512,
            temperature: 0.2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// The full application configuration.
///
/// # Example
///
/// ```rust,ignore
/// let mut config = AppConfig::from_env();
/// config.chunking.chunk_size = 512;
/// config.validate()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Chunking parameters.
    pub chunking: ChunkingConfig,
    /// Retrieval parameters.
    pub retrieval: RetrievalConfig,
    /// Guard-layer parameters.
    pub guard: GuardConfig,
    /// Embedding-provider parameters.
    pub embedding: EmbeddingConfig,
    /// Generation parameters.
    pub generation: GenerationConfig,
    /// Path of the persisted index file.
    pub index_path: PathBuf,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl AppConfig {
    /// Build a configuration from defaults plus `MEDASSIST_*` environment
    /// overrides.
    ///
    /// Recognised variables: `MEDASSIST_CHUNK_SIZE`, `MEDASSIST_CHUNK_OVERLAP`,
    /// `MEDASSIST_TOP_K`, `MEDASSIST_MAX_QUERY_CHARS`, `MEDASSIST_INDEX_PATH`,
    /// `MEDASSIST_CHAT_MODEL`, `MEDASSIST_EMBED_MODEL`, `MEDASSIST_BASE_URL`.
    /// Unparseable values fall back to the default rather than aborting; the
    /// result is still validated by [`validate`](Self::validate).
    pub fn from_env() -> Self {
        let mut config = Self { index_path: PathBuf::from("data/index.bin"), ..Self::default() };

        if let Some(v) = env_parse("MEDASSIST_CHUNK_SIZE") {
            config.chunking.chunk_size = v;
        }
        if let Some(v) = env_parse("MEDASSIST_CHUNK_OVERLAP") {
            config.chunking.chunk_overlap = v;
        }
        if let Some(v) = env_parse("MEDASSIST_TOP_K") {
            config.retrieval.top_k = v;
        }
        if let Some(v) = env_parse("MEDASSIST_MAX_QUERY_CHARS") {
            config.guard.max_query_chars = v;
        }
        if let Ok(v) = std::env::var("MEDASSIST_INDEX_PATH") {
            config.index_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("MEDASSIST_CHAT_MODEL") {
            config.generation.model = v;
        }
        if let Ok(v) = std::env::var("MEDASSIST_EMBED_MODEL") {
            config.embedding.model = v;
        }
        if let Ok(v) = std::env::var("MEDASSIST_BASE_URL") {
            config.embedding.base_url = v.clone();
            config.generation.base_url = v;
        }

        config
    }

    /// Validate cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::Configuration`] if:
    /// - `chunk_size == 0` or `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_query_chars == 0`
    /// - `batch_size == 0` or `max_tokens == 0`
    /// - `temperature` is outside `[0.0, 2.0]`
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(AssistError::Configuration("chunk_size must be greater than zero".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(AssistError::Configuration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(AssistError::Configuration("top_k must be greater than zero".into()));
        }
        if self.guard.max_query_chars == 0 {
            return Err(AssistError::Configuration(
                "max_query_chars must be greater than zero".into(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(AssistError::Configuration("batch_size must be greater than zero".into()));
        }
        if self.generation.max_tokens == 0 {
            return Err(AssistError::Configuration("max_tokens must be greater than zero".into()));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(AssistError::Configuration(format!(
                "temperature ({}) must be between 0.0 and 2.0",
                self.generation.temperature
            )));
        }
        Ok(())
    }
}
