//! Result types returned to the caller.

use serde::{Deserialize, Serialize};

/// A citation pointing into the document collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    /// Source document identifier (filename).
    pub source: String,
    /// 1-based page number within the source.
    pub page: u32,
}

/// A grounded answer with its citations.
///
/// Ephemeral: returned to the caller and discarded by the core. Citations are
/// derived from the chunks supplied to the model, never parsed out of model
/// output, so they cannot be hallucinated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The answer text.
    pub text: String,
    /// Citations in first-appearance order, duplicates collapsed.
    pub sources: Vec<Citation>,
    /// The medical disclaimer attached to every response.
    pub disclaimer: String,
    /// Set when a safety rule fired (crisis short-circuit or post-check
    /// substitution).
    pub safety_flagged: bool,
}
