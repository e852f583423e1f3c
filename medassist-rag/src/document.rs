//! Data types for documents, chunks, and retrieval results.

use serde::{Deserialize, Serialize};

/// A source document: raw extracted text plus its source identifier.
///
/// Pages are delimited by form-feed (`\u{0C}`) characters in the raw text,
/// the convention emitted by PDF-to-text extraction. A document without form
/// feeds is a single page. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Source identifier (typically the filename).
    pub source: String,
    /// The full extracted text.
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), text: text.into() }
    }

    /// The document's pages, in order. Always at least one entry.
    pub fn pages(&self) -> Vec<&str> {
        self.text.split('\u{0C}').collect()
    }
}

/// A bounded passage of one document page, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier, `{source}#{seq}`.
    pub id: String,
    /// The passage text.
    pub text: String,
    /// Source document identifier.
    pub source: String,
    /// 1-based page number the passage was extracted from.
    pub page: u32,
    /// Sequence index of this chunk within its document.
    pub seq: usize,
}

/// A retrieved [`Chunk`] paired with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}
