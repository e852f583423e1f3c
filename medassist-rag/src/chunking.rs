//! Document chunking.
//!
//! [`TextChunker`] splits each document page into overlapping windows of at
//! most `chunk_size` characters. Cuts prefer the last semantic boundary
//! inside the window — paragraph break, then sentence end, then whitespace —
//! falling back to a hard character cut. The next window starts
//! `chunk_overlap` characters before the previous cut, so consecutive chunks
//! from a page always share the configured overlap and concatenating the
//! chunks minus overlaps reconstructs the page text exactly. Windows that
//! contain only whitespace are dropped, so the overlap and reconstruction
//! guarantees hold for pages whose whitespace runs are shorter than
//! `chunk_size`.
//!
//! All arithmetic is on `char` indices, so multi-byte text never splits
//! inside a code point.

use medassist_core::ChunkingConfig;

use crate::document::{Chunk, Document};

/// Splits documents into overlapping, provenance-tagged chunks.
///
/// Pure transform: no side effects, finite output, restartable.
///
/// # Example
///
/// ```rust,ignore
/// use medassist_rag::TextChunker;
///
/// let chunker = TextChunker::new(&config.chunking);
/// let chunks = chunker.chunk_document(&document);
/// ```
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a chunker from validated configuration.
    ///
    /// `AppConfig::validate` has already enforced `chunk_overlap < chunk_size`.
    pub fn new(config: &ChunkingConfig) -> Self {
        Self { chunk_size: config.chunk_size, chunk_overlap: config.chunk_overlap }
    }

    /// Split a document into chunks.
    ///
    /// Empty or whitespace-only pages yield no chunks, and whitespace-only
    /// windows within a page are dropped — on pages with whitespace runs
    /// longer than `chunk_size`, consecutive chunks may therefore span such
    /// a run rather than share the overlap, and lossless reconstruction does
    /// not apply. Chunk IDs are `{source}#{seq}` with `seq` counting across
    /// the whole document.
    pub fn chunk_document(&self, document: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut seq = 0;

        for (page_idx, page) in document.pages().into_iter().enumerate() {
            for text in self.split_page(page) {
                chunks.push(Chunk {
                    id: format!("{}#{seq}", document.source),
                    text,
                    source: document.source.clone(),
                    page: page_idx as u32 + 1,
                    seq,
                });
                seq += 1;
            }
        }

        chunks
    }

    /// Split one page into window texts.
    fn split_page(&self, page: &str) -> Vec<String> {
        if page.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = page.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![page.to_string()];
        }

        let mut pieces = Vec::new();
        let mut start = 0;

        loop {
            let window_end = (start + self.chunk_size).min(chars.len());
            if window_end == chars.len() {
                push_piece(&mut pieces, &chars[start..window_end]);
                break;
            }

            let cut = self.find_cut(&chars, start, window_end);
            push_piece(&mut pieces, &chars[start..cut]);
            // Overlap: the next window re-covers the tail of this one.
            start = cut - self.chunk_overlap;
        }

        pieces
    }

    /// Choose where to cut the window `[start, window_end)`.
    ///
    /// The cut must land after `start + chunk_overlap` so every chunk is
    /// longer than the overlap and the scan always makes progress. Within
    /// that range the latest paragraph break wins, then the latest sentence
    /// end, then the latest whitespace; otherwise the hard window end.
    fn find_cut(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        let lo = start + self.chunk_overlap + 1;

        let mut sentence = None;
        let mut whitespace = None;

        for cut in (lo..=window_end).rev() {
            let prev = chars[cut - 1];
            if prev == '\n' && cut >= 2 && chars[cut - 2] == '\n' {
                return cut;
            }
            if sentence.is_none()
                && prev.is_whitespace()
                && cut >= 2
                && matches!(chars[cut - 2], '.' | '!' | '?')
            {
                sentence = Some(cut);
            }
            if whitespace.is_none() && prev.is_whitespace() {
                whitespace = Some(cut);
            }
        }

        sentence.or(whitespace).unwrap_or(window_end)
    }
}

/// Append a window to the output unless it is whitespace-only.
fn push_piece(pieces: &mut Vec<String>, chars: &[char]) {
    if chars.iter().any(|c| !c.is_whitespace()) {
        pieces.push(chars.iter().collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(&ChunkingConfig { chunk_size: size, chunk_overlap: overlap })
    }

    #[test]
    fn short_page_is_one_chunk() {
        let doc = Document::new("a.txt", "short text");
        let chunks = chunker(100, 20).chunk_document(&doc);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(chunks[0].page, 1);
        assert_eq!(chunks[0].id, "a.txt#0");
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let doc = Document::new("a.txt", "   \n  ");
        assert!(chunker(100, 20).chunk_document(&doc).is_empty());
    }

    #[test]
    fn pages_are_numbered_from_one() {
        let doc = Document::new("a.txt", "first page\u{0C}second page");
        let chunks = chunker(100, 20).chunk_document(&doc);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page, 1);
        assert_eq!(chunks[1].page, 2);
        assert_eq!(chunks[1].seq, 1);
    }

    #[test]
    fn consecutive_chunks_share_the_overlap() {
        let text = "word ".repeat(200);
        let doc = Document::new("a.txt", text);
        let chunks = chunker(100, 25).chunk_document(&doc);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            let tail: String = prev[prev.len() - 25..].iter().collect();
            let head: String = next[..25].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn prefers_sentence_boundaries() {
        let text = "This is the first sentence. This is the second sentence. \
                    This is the third sentence. This is the fourth sentence.";
        let doc = Document::new("a.txt", text);
        let chunks = chunker(70, 10).chunk_document(&doc);
        // At least one cut should land just after a sentence end.
        assert!(chunks[..chunks.len() - 1]
            .iter()
            .any(|c| c.text.trim_end().ends_with('.')));
    }

    #[test]
    fn whitespace_runs_longer_than_the_window_drop_empty_windows() {
        let text = format!("alpha{}omega", " ".repeat(200));
        let doc = Document::new("a.txt", text);
        let chunks = chunker(50, 10).chunk_document(&doc);
        assert!(chunks.iter().all(|c| !c.text.trim().is_empty()));
        assert!(chunks.first().unwrap().text.contains("alpha"));
        assert!(chunks.last().unwrap().text.contains("omega"));
    }

    #[test]
    fn multibyte_text_never_splits_inside_a_code_point() {
        let text = "糖尿病は慢性疾患です。".repeat(50);
        let doc = Document::new("jp.txt", text.clone());
        let chunks = chunker(80, 10).chunk_document(&doc);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 80);
        }
        // Reconstruction: first chunk plus the non-overlap suffix of each
        // following chunk reproduces the page.
        let mut rebuilt: String = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.text.chars().skip(10));
        }
        assert_eq!(rebuilt, text);
    }
}
