//! Prompt assembly for grounded answering.

use medassist_core::Message;
use medassist_rag::ScoredChunk;

/// The fixed system instruction enforcing grounded, safe medical responses.
const SYSTEM_PROMPT_HEADER: &str = "You are MedAssist, an AI assistant specialised in medical \
information. Your knowledge comes exclusively from a curated medical document library that has \
been retrieved for you.

RULES YOU MUST ALWAYS FOLLOW:
1. Base every answer solely on the provided context documents.
2. If the answer is not in the context, say \"I don't have enough information in my knowledge \
base to answer that reliably\" — never fabricate facts.
3. Never recommend specific dosages, prescriptions, or diagnoses.
4. Always remind the user to consult a licensed healthcare professional for personal medical \
decisions.
5. Use plain, non-technical language unless the user is clearly a professional.
6. Be concise, structured, and factual.
7. If a question is outside medical topics, politely redirect.";

/// The fixed answer returned when retrieval produced no context.
pub const INSUFFICIENT_CONTEXT_ANSWER: &str =
    "I don't have enough information in my knowledge base to answer that reliably. \
Please consult a licensed healthcare professional for guidance.";

/// Build the chat messages for a query and its retrieved context.
///
/// Each chunk is labelled with its provenance so the model can ground its
/// answer; the citation list is derived separately from the same chunks.
pub fn build_messages(query: &str, retrieved: &[ScoredChunk]) -> Vec<Message> {
    let mut context = String::new();
    for scored in retrieved {
        let chunk = &scored.chunk;
        context.push_str(&format!("[{} — p.{}]\n{}\n\n", chunk.source, chunk.page, chunk.text));
    }

    let system = format!(
        "{SYSTEM_PROMPT_HEADER}\n\n\
         Context documents:\n\
         ──────────────────\n\
         {context}\
         ──────────────────"
    );

    vec![Message::system(system), Message::user(query)]
}
