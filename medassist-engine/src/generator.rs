//! Answer generation: prompt the model, derive citations from the context.

use std::sync::Arc;

use medassist_core::{
    Answer, AssistError, ChatModel, Citation, CompletionRequest, GenerationConfig, Result,
};
use medassist_rag::ScoredChunk;
use tracing::{debug, info};

use crate::prompt::{build_messages, INSUFFICIENT_CONTEXT_ANSWER};

/// Derive the citation list from the chunks placed into the prompt.
///
/// Never parsed out of model output, so citations cannot be hallucinated.
/// Deduplicated by `(source, page)` in first-appearance order.
pub fn citations_for(retrieved: &[ScoredChunk]) -> Vec<Citation> {
    let mut citations: Vec<Citation> = Vec::new();
    for scored in retrieved {
        let citation =
            Citation { source: scored.chunk.source.clone(), page: scored.chunk.page };
        if !citations.contains(&citation) {
            citations.push(citation);
        }
    }
    citations
}

/// Assembles the prompt, calls the chat model, and post-processes the
/// completion into an [`Answer`].
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
    config: GenerationConfig,
}

impl AnswerGenerator {
    /// Create a generator over an injected chat model.
    pub fn new(model: Arc<dyn ChatModel>, config: GenerationConfig) -> Self {
        Self { model, config }
    }

    /// Generate a grounded answer for the query and its retrieved context.
    ///
    /// With an empty retrieval result the model is never called: the fixed
    /// insufficient-information answer comes back with no citations.
    ///
    /// # Errors
    ///
    /// Transient provider failures surface as [`AssistError::Generation`]
    /// and deadline overruns as [`AssistError::Timeout`]; both are
    /// retryable by the caller. This component never retries itself.
    pub async fn generate(&self, query: &str, retrieved: &[ScoredChunk]) -> Result<Answer> {
        if retrieved.is_empty() {
            debug!("empty retrieval result; skipping model call");
            return Ok(Answer {
                text: INSUFFICIENT_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
                disclaimer: medassist_guard::DISCLAIMER.to_string(),
                safety_flagged: false,
            });
        }

        let request = CompletionRequest {
            messages: build_messages(query, retrieved),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let completion = tokio::time::timeout(self.config.timeout, self.model.complete(request))
            .await
            .map_err(|_| AssistError::Timeout {
                operation: "chat".into(),
                elapsed_ms: self.config.timeout.as_millis() as u64,
            })??;

        info!(
            model = self.model.name(),
            context_chunks = retrieved.len(),
            truncated = completion.truncated,
            "answer generated"
        );

        Ok(Answer {
            text: completion.text,
            sources: citations_for(retrieved),
            disclaimer: medassist_guard::DISCLAIMER.to_string(),
            safety_flagged: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medassist_rag::Chunk;

    fn scored(source: &str, page: u32, seq: usize) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: format!("{source}#{seq}"),
                text: "some text".into(),
                source: source.to_string(),
                page,
                seq,
            },
            score: 0.8,
        }
    }

    #[test]
    fn citations_collapse_duplicates_in_first_appearance_order() {
        let retrieved = vec![
            scored("b.txt", 2, 0),
            scored("a.txt", 1, 1),
            scored("b.txt", 2, 2),
            scored("b.txt", 3, 3),
        ];
        let citations = citations_for(&retrieved);
        assert_eq!(citations.len(), 3);
        assert_eq!(citations[0], Citation { source: "b.txt".into(), page: 2 });
        assert_eq!(citations[1], Citation { source: "a.txt".into(), page: 1 });
        assert_eq!(citations[2], Citation { source: "b.txt".into(), page: 3 });
    }
}
