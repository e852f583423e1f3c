//! Query-time retrieval: embed the query, search the live index.

use std::sync::Arc;

use medassist_core::{AssistError, Result, RetrievalConfig};
use tracing::debug;

use crate::document::ScoredChunk;
use crate::embedding::EmbeddingProvider;
use crate::index::IndexHandle;

/// Orchestrates embedding a query and fetching top-K chunks from the index.
///
/// Applies no filtering beyond what the index returns, except the optional
/// configured score threshold (default: none).
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    handle: IndexHandle,
    config: RetrievalConfig,
}

impl Retriever {
    /// Create a retriever over the shared index handle.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        handle: IndexHandle,
        config: RetrievalConfig,
    ) -> Self {
        Self { embedder, handle, config }
    }

    /// Retrieve the `k` chunks most relevant to the query.
    ///
    /// The embedding call runs under the configured embed timeout; the index
    /// scan runs on a blocking thread under the search timeout.
    ///
    /// # Errors
    ///
    /// - [`AssistError::IndexUnavailable`] when no index is loaded — the
    ///   expected pre-ingestion state, propagated unchanged.
    /// - [`AssistError::Timeout`] when either deadline fires.
    /// - Provider failures pass through as [`AssistError::Embedding`].
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let vector = tokio::time::timeout(self.config.embed_timeout, self.embedder.embed(query))
            .await
            .map_err(|_| AssistError::Timeout {
                operation: "embed_query".into(),
                elapsed_ms: self.config.embed_timeout.as_millis() as u64,
            })??;

        let index = self.handle.snapshot()?;

        let task = tokio::task::spawn_blocking(move || index.search(&vector, k));
        let results = tokio::time::timeout(self.config.search_timeout, task)
            .await
            .map_err(|_| AssistError::Timeout {
                operation: "search".into(),
                elapsed_ms: self.config.search_timeout.as_millis() as u64,
            })?
            .unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()))?;

        let results = match self.config.score_threshold {
            Some(threshold) => results.into_iter().filter(|r| r.score >= threshold).collect(),
            None => results,
        };

        debug!(result_count = results.len(), k, "retrieval completed");
        Ok(results)
    }
}
