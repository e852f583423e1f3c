//! Property tests for index search ordering.

use std::time::Duration;

use medassist_rag::{build_index, Chunk, MockEmbedder};
use proptest::prelude::*;

fn chunk(seq: usize, text: String) -> Chunk {
    Chunk { id: format!("doc.txt#{seq}"), text, source: "doc.txt".into(), page: 1, seq }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of indexed chunks, searching returns results ordered by
    /// non-increasing cosine similarity, with at most `k` entries and never
    /// more than the number of stored chunks.
    #[test]
    fn results_ordered_descending_and_bounded_by_k(
        texts in proptest::collection::vec("[a-z ]{5,40}", 1..25),
        query in "[a-z ]{5,40}",
        k in 1usize..30,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let results = rt.block_on(async {
            let embedder = MockEmbedder::new(32);
            let chunks: Vec<Chunk> =
                texts.into_iter().enumerate().map(|(i, t)| chunk(i, t)).collect();
            let count = chunks.len();
            let index =
                build_index(chunks, &embedder, 8, Duration::from_secs(5)).await.unwrap();

            use medassist_rag::EmbeddingProvider;
            let query_vector = embedder.embed(&query).await.unwrap();
            (index.search(&query_vector, k).unwrap(), count)
        });

        let (results, stored) = results;
        prop_assert!(results.len() <= k);
        prop_assert!(results.len() <= stored);

        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }

    /// Equal-score ties keep insertion order (stable sort).
    #[test]
    fn ties_keep_insertion_order(copies in 2usize..8, k in 2usize..10) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let results = rt.block_on(async {
            let embedder = MockEmbedder::new(32);
            // Identical texts embed identically, so every score ties.
            let chunks: Vec<Chunk> =
                (0..copies).map(|i| chunk(i, "same text every time".into())).collect();
            let index =
                build_index(chunks, &embedder, 8, Duration::from_secs(5)).await.unwrap();

            use medassist_rag::EmbeddingProvider;
            let query_vector = embedder.embed("same text every time").await.unwrap();
            index.search(&query_vector, k).unwrap()
        });

        for window in results.windows(2) {
            prop_assert!(window[0].chunk.seq < window[1].chunk.seq);
        }
    }
}
