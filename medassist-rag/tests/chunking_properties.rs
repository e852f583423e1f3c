//! Property tests for the chunker's overlap and reconstruction guarantees.

use medassist_core::ChunkingConfig;
use medassist_rag::{Document, TextChunker};
use proptest::prelude::*;

/// Generate plain word-based text without pathological whitespace runs.
fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,8}", 1..150).prop_map(|words| words.join(" "))
}

/// Generate a (chunk_size, chunk_overlap) pair with overlap < size.
fn arb_chunk_config() -> impl Strategy<Value = (usize, usize)> {
    (20usize..120).prop_flat_map(|size| (Just(size), 0usize..size.min(30)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every chunk is at most `chunk_size` characters and none is
    /// whitespace-only.
    #[test]
    fn chunks_respect_the_size_bound((size, overlap) in arb_chunk_config(), text in arb_text()) {
        let chunker = TextChunker::new(&ChunkingConfig { chunk_size: size, chunk_overlap: overlap });
        let doc = Document::new("prop.txt", text);
        for chunk in chunker.chunk_document(&doc) {
            prop_assert!(chunk.text.chars().count() <= size);
            prop_assert!(!chunk.text.trim().is_empty());
        }
    }

    /// Consecutive chunks from the same page share exactly the configured
    /// overlap prefix/suffix.
    #[test]
    fn consecutive_chunks_share_the_overlap(
        (size, overlap) in arb_chunk_config(),
        text in arb_text(),
    ) {
        let chunker = TextChunker::new(&ChunkingConfig { chunk_size: size, chunk_overlap: overlap });
        let doc = Document::new("prop.txt", text);
        let chunks = chunker.chunk_document(&doc);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            prop_assert!(prev.len() > overlap);
            prop_assert_eq!(&prev[prev.len() - overlap..], &next[..overlap]);
        }
    }

    /// Concatenating chunk texts minus overlaps reconstructs the page
    /// losslessly — no characters dropped at boundaries.
    #[test]
    fn chunks_reconstruct_the_page((size, overlap) in arb_chunk_config(), text in arb_text()) {
        let chunker = TextChunker::new(&ChunkingConfig { chunk_size: size, chunk_overlap: overlap });
        let doc = Document::new("prop.txt", text.clone());
        let chunks = chunker.chunk_document(&doc);
        prop_assert!(!chunks.is_empty());

        let mut rebuilt: String = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.text.chars().skip(overlap));
        }
        prop_assert_eq!(rebuilt, text);
    }

    /// Chunk sequence indexes are contiguous and every chunk carries its
    /// source and a valid page number.
    #[test]
    fn provenance_is_complete((size, overlap) in arb_chunk_config(), text in arb_text()) {
        let chunker = TextChunker::new(&ChunkingConfig { chunk_size: size, chunk_overlap: overlap });
        let doc = Document::new("prop.txt", text);
        for (i, chunk) in chunker.chunk_document(&doc).iter().enumerate() {
            prop_assert_eq!(chunk.seq, i);
            prop_assert_eq!(chunk.source.as_str(), "prop.txt");
            let expected_id = format!("prop.txt#{i}");
            prop_assert_eq!(chunk.id.as_str(), expected_id.as_str());
            prop_assert_eq!(chunk.page, 1);
        }
    }
}
