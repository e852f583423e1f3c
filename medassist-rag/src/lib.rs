//! # medassist-rag
//!
//! Retrieval machinery for the MedAssist QA core: document model, chunker,
//! embedding provider boundary, brute-force cosine vector index, durable
//! index storage, and the query-time retriever.
//!
//! ## Ingestion flow
//!
//! ```rust,ignore
//! use medassist_rag::{build_index, IndexStore, TextChunker};
//!
//! let chunker = TextChunker::new(&config.chunking);
//! let chunks: Vec<_> = documents.iter().flat_map(|d| chunker.chunk_document(d)).collect();
//! let index = build_index(chunks, embedder.as_ref(), 64, timeout).await?;
//! IndexStore::new(&config.index_path).save(&index)?;
//! handle.install(index);
//! ```
//!
//! ## Query flow
//!
//! ```rust,ignore
//! let retriever = Retriever::new(embedder, handle.clone(), config.retrieval.clone());
//! let top = retriever.retrieve("What is diabetes?", 4).await?;
//! ```

pub mod chunking;
pub mod document;
pub mod embedding;
pub mod index;
pub mod openai;
pub mod retriever;
pub mod store;

pub use chunking::TextChunker;
pub use document::{Chunk, Document, ScoredChunk};
pub use embedding::{EmbeddingProvider, MockEmbedder};
pub use index::{build_index, IndexHandle, VectorIndex};
pub use openai::OpenAiEmbedder;
pub use retriever::Retriever;
pub use store::IndexStore;
