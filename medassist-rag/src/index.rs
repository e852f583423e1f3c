//! The in-memory vector index and its shared handle.
//!
//! [`VectorIndex`] is an exact brute-force cosine index: a flat row-major
//! `Vec<f32>` of L2-normalised vectors parallel to a `Vec<Chunk>` of
//! metadata. Built in bulk, immutable afterwards, replaced wholesale.
//! Brute force is the right trade-off at the chunk-count scale this system
//! targets (tens of thousands of vectors); scores stay exactly monotonic
//! with true cosine similarity.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use medassist_core::{AssistError, Result};
use tracing::info;

use crate::document::{Chunk, ScoredChunk};
use crate::embedding::EmbeddingProvider;

/// L2-normalise a vector in place. A zero vector is left untouched.
pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector {
            *value /= norm;
        }
    }
}

/// An immutable, exact-search vector index over chunk embeddings.
#[derive(Debug)]
pub struct VectorIndex {
    model: String,
    dimensions: usize,
    built_at: DateTime<Utc>,
    /// Row-major normalised vectors, `chunks.len() * dimensions` long.
    vectors: Vec<f32>,
    chunks: Vec<Chunk>,
}

impl VectorIndex {
    pub(crate) fn from_parts(
        model: String,
        dimensions: usize,
        built_at: DateTime<Utc>,
        vectors: Vec<f32>,
        chunks: Vec<Chunk>,
    ) -> Self {
        Self { model, dimensions, built_at, vectors, chunks }
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The embedding model the index was built with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// When the index was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// The indexed chunks, in insertion order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    /// Search for the `k` chunks most similar to the query vector.
    ///
    /// The score is the dot product of normalised vectors, i.e. cosine
    /// similarity. Results are sorted by non-increasing score; ties keep
    /// insertion order (stable sort). An empty index returns an empty vec.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::InvalidArgument`] if `k == 0` or the query
    /// dimensionality does not match the index.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(AssistError::InvalidArgument("k must be greater than zero".into()));
        }
        if self.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(AssistError::InvalidArgument(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut normalized = query.to_vec();
        l2_normalize(&mut normalized);

        let mut scored: Vec<ScoredChunk> = self
            .vectors
            .chunks_exact(self.dimensions)
            .zip(&self.chunks)
            .map(|(row, chunk)| {
                let score: f32 = row.iter().zip(&normalized).map(|(a, b)| a * b).sum();
                ScoredChunk { chunk: chunk.clone(), score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Embed all chunks (batched) and assemble a [`VectorIndex`].
///
/// All-or-nothing: any embedding failure aborts the whole build. Each batch
/// call runs under `timeout`. Dimension or count mismatches from the provider
/// are reported as [`AssistError::Embedding`].
pub async fn build_index(
    chunks: Vec<Chunk>,
    embedder: &dyn EmbeddingProvider,
    batch_size: usize,
    timeout: Duration,
) -> Result<VectorIndex> {
    if batch_size == 0 {
        return Err(AssistError::InvalidArgument("batch_size must be greater than zero".into()));
    }

    let mut dimensions = embedder.dimensions();
    let mut vectors: Vec<f32> = Vec::new();

    for batch in chunks.chunks(batch_size) {
        let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();

        let embeddings = tokio::time::timeout(timeout, embedder.embed_batch(&texts))
            .await
            .map_err(|_| AssistError::Timeout {
                operation: "embed_batch".into(),
                elapsed_ms: timeout.as_millis() as u64,
            })??;

        if embeddings.len() != batch.len() {
            return Err(AssistError::Embedding {
                provider: embedder.model_name().to_string(),
                message: format!(
                    "provider returned {} embeddings for {} chunks",
                    embeddings.len(),
                    batch.len()
                ),
            });
        }

        for mut embedding in embeddings {
            // The provider-reported dimensionality wins over the configured one.
            if vectors.is_empty() {
                dimensions = embedding.len();
            }
            if embedding.len() != dimensions {
                return Err(AssistError::Embedding {
                    provider: embedder.model_name().to_string(),
                    message: format!(
                        "inconsistent embedding dimensions: got {}, expected {dimensions}",
                        embedding.len()
                    ),
                });
            }
            l2_normalize(&mut embedding);
            vectors.extend_from_slice(&embedding);
        }
    }

    let index = VectorIndex::from_parts(
        embedder.model_name().to_string(),
        dimensions,
        Utc::now(),
        vectors,
        chunks,
    );
    info!(chunk_count = index.len(), dimensions = index.dimensions(), "vector index built");
    Ok(index)
}

/// The shared index slot read by concurrent requests.
///
/// Index replacement is a pointer swap under a briefly-held write lock;
/// readers holding a previous `Arc` finish against the old index and never
/// observe a partially-built one.
#[derive(Clone, Default)]
pub struct IndexHandle {
    inner: Arc<RwLock<Option<Arc<VectorIndex>>>>,
}

impl IndexHandle {
    /// Create an empty handle (the expected pre-ingestion state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically install a new index, replacing any previous one.
    pub fn install(&self, index: VectorIndex) {
        let mut slot = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(Arc::new(index));
    }

    /// Snapshot the current index.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::IndexUnavailable`] when no index is loaded —
    /// the expected state before first ingestion.
    pub fn snapshot(&self) -> Result<Arc<VectorIndex>> {
        let slot = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.clone().ok_or_else(|| AssistError::IndexUnavailable {
            reason: "no index loaded; run ingestion first".into(),
        })
    }

    /// Snapshot the current index if one is loaded.
    pub fn get(&self) -> Option<Arc<VectorIndex>> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
