//! The engine facade consumed by the serving layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use medassist_core::{Answer, AppConfig, AssistError, ChatModel, Result};
use medassist_guard::{Guard, PostCheckOutcome, PreCheckOutcome, CRISIS_RESPONSE, DISCLAIMER,
    REFUSAL};
use medassist_rag::{
    build_index, Document, EmbeddingProvider, IndexHandle, IndexStore, Retriever, TextChunker,
};
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::generator::AnswerGenerator;

/// Counts reported after a successful index rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Number of documents ingested.
    pub documents: usize,
    /// Number of chunks indexed.
    pub chunks: usize,
    /// Embedding dimensionality.
    pub dimensions: usize,
}

/// Health/ops snapshot of the live index.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    /// Whether an index is loaded and queries can be served.
    pub ready: bool,
    /// Number of distinct source documents in the live index.
    pub documents: usize,
    /// Number of indexed chunks.
    pub chunks: usize,
    /// Embedding dimensionality.
    pub dimensions: usize,
    /// The embedding model the index was built with.
    pub embedding_model: Option<String>,
    /// When the live index was built.
    pub built_at: Option<DateTime<Utc>>,
}

/// The retrieval-augmented QA engine.
///
/// Wires guard, retriever, generator and index store from one validated
/// [`AppConfig`] with injected provider clients (no globals). Each query runs
/// the strictly sequential chain Guard(pre) → Retrieve → Generate →
/// Guard(post); requests are stateless and share only the read-only index
/// snapshot.
///
/// # Example
///
/// ```rust,ignore
/// use medassist_engine::Engine;
///
/// let engine = Engine::builder()
///     .config(config)
///     .embedder(embedder)
///     .chat_model(model)
///     .build()?;
///
/// engine.load_index()?;
/// let answer = engine.handle_query("What is diabetes?").await?;
/// ```
pub struct Engine {
    config: AppConfig,
    guard: Guard,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    handle: IndexHandle,
    retriever: Retriever,
    generator: AnswerGenerator,
    store: IndexStore,
}

impl Engine {
    /// Create a new [`EngineBuilder`].
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Answer one query.
    ///
    /// Never panics on any taxonomy failure: every error carries an
    /// [`ErrorKind`](medassist_core::ErrorKind) and a user-facing message for
    /// transport mapping. A crisis indicator short-circuits before retrieval
    /// and returns the fixed crisis-resources answer, safety-flagged.
    pub async fn handle_query(&self, raw_query: &str) -> Result<Answer> {
        let request_id = Uuid::new_v4();
        let span = info_span!("handle_query", %request_id);

        async {
            info!(query_chars = raw_query.chars().count(), "query received");

            let query = match self.guard.pre_check(raw_query)? {
                PreCheckOutcome::Crisis => {
                    return Ok(Answer {
                        text: CRISIS_RESPONSE.to_string(),
                        sources: Vec::new(),
                        disclaimer: DISCLAIMER.to_string(),
                        safety_flagged: true,
                    });
                }
                PreCheckOutcome::Clean(query) => query,
            };

            let retrieved = self.retriever.retrieve(&query, self.config.retrieval.top_k).await?;
            let mut answer = self.generator.generate(&query, &retrieved).await?;

            if let PostCheckOutcome::Refused { rule } = self.guard.post_check(&answer.text) {
                warn!(%rule, "substituting refusal for generated answer");
                answer = Answer {
                    text: REFUSAL.to_string(),
                    sources: Vec::new(),
                    disclaimer: DISCLAIMER.to_string(),
                    safety_flagged: true,
                };
            }

            info!(sources = answer.sources.len(), flagged = answer.safety_flagged, "query answered");
            Ok(answer)
        }
        .instrument(span)
        .await
    }

    /// Rebuild the index from scratch: chunk → embed (batched) → build →
    /// persist (atomic rename) → swap the live handle.
    ///
    /// Idempotent and safe to re-run. Any failure leaves both the on-disk
    /// and in-memory index exactly as they were.
    pub async fn rebuild_index(&self, documents: &[Document]) -> Result<IndexStats> {
        let mut chunks = Vec::new();
        for document in documents {
            let document_chunks = self.chunker.chunk_document(document);
            info!(
                source = %document.source,
                chunk_count = document_chunks.len(),
                "document chunked"
            );
            chunks.extend(document_chunks);
        }
        let chunk_count = chunks.len();

        let index = build_index(
            chunks,
            self.embedder.as_ref(),
            self.config.embedding.batch_size,
            self.config.embedding.timeout,
        )
        .await?;
        let dimensions = index.dimensions();

        self.store.save(&index)?;
        self.handle.install(index);

        info!(documents = documents.len(), chunks = chunk_count, "index rebuilt");
        Ok(IndexStats { documents: documents.len(), chunks: chunk_count, dimensions })
    }

    /// Load the persisted index into the live handle.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::IndexUnavailable`] when the file is missing or
    /// corrupt — expected before first ingestion; callers typically warn and
    /// continue.
    pub fn load_index(&self) -> Result<()> {
        let index = self.store.load()?;
        self.handle.install(index);
        Ok(())
    }

    /// Health/ops snapshot of the live index.
    pub fn stats(&self) -> EngineStats {
        match self.handle.get() {
            Some(index) => {
                let mut sources: Vec<&str> =
                    index.chunks().iter().map(|c| c.source.as_str()).collect();
                sources.sort_unstable();
                sources.dedup();
                EngineStats {
                    ready: true,
                    documents: sources.len(),
                    chunks: index.len(),
                    dimensions: index.dimensions(),
                    embedding_model: Some(index.model().to_string()),
                    built_at: Some(index.built_at()),
                }
            }
            None => EngineStats {
                ready: false,
                documents: 0,
                chunks: 0,
                dimensions: 0,
                embedding_model: None,
                built_at: None,
            },
        }
    }
}

/// Builder for constructing an [`Engine`].
///
/// The configuration and both provider clients are required; the index
/// handle defaults to an empty slot.
#[derive(Default)]
pub struct EngineBuilder {
    config: Option<AppConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    chat_model: Option<Arc<dyn ChatModel>>,
}

impl EngineBuilder {
    /// Set the application configuration.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider client.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the chat-completion provider client.
    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Validate the configuration and wire the engine.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::Configuration`] if a required field is missing
    /// or the configuration fails validation — reported here, at startup,
    /// not at first use.
    pub fn build(self) -> Result<Engine> {
        let config = self
            .config
            .ok_or_else(|| AssistError::Configuration("config is required".into()))?;
        config.validate()?;
        let embedder = self
            .embedder
            .ok_or_else(|| AssistError::Configuration("embedder is required".into()))?;
        let chat_model = self
            .chat_model
            .ok_or_else(|| AssistError::Configuration("chat_model is required".into()))?;

        let handle = IndexHandle::new();
        let guard = Guard::new(config.guard.clone());
        let chunker = TextChunker::new(&config.chunking);
        let retriever =
            Retriever::new(Arc::clone(&embedder), handle.clone(), config.retrieval.clone());
        let generator = AnswerGenerator::new(chat_model, config.generation.clone());
        let store = IndexStore::new(&config.index_path);

        Ok(Engine { config, guard, chunker, embedder, handle, retriever, generator, store })
    }
}
