//! Persistence tests: save/load round trip, corrupt and missing files.

use std::time::Duration;

use medassist_core::AssistError;
use medassist_rag::{build_index, Chunk, EmbeddingProvider, IndexStore, MockEmbedder};

fn chunk(seq: usize, text: &str) -> Chunk {
    Chunk {
        id: format!("doc.txt#{seq}"),
        text: text.to_string(),
        source: "doc.txt".into(),
        page: 1,
        seq,
    }
}

async fn sample_index(embedder: &MockEmbedder) -> medassist_rag::VectorIndex {
    let chunks = vec![
        chunk(0, "diabetes is a chronic condition affecting insulin regulation"),
        chunk(1, "hypertension is persistently elevated blood pressure"),
        chunk(2, "asthma narrows the airways in the lungs"),
    ];
    build_index(chunks, embedder, 2, Duration::from_secs(5)).await.unwrap()
}

#[tokio::test]
async fn save_then_load_round_trips_search_results() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.bin");
    let embedder = MockEmbedder::new(32);

    let index = sample_index(&embedder).await;
    let store = IndexStore::new(&path);
    store.save(&index).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), index.len());
    assert_eq!(loaded.model(), "mock-embedder");
    assert_eq!(loaded.dimensions(), 32);

    let query = embedder.embed("what is diabetes").await.unwrap();
    let before = index.search(&query, 2).unwrap();
    let after = loaded.search(&query, 2).unwrap();
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.chunk.id, b.chunk.id);
        assert!((a.score - b.score).abs() < 1e-6);
    }
}

#[tokio::test]
async fn loading_a_missing_file_is_index_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let store = IndexStore::new(dir.path().join("nope.bin"));
    let err = store.load().unwrap_err();
    assert!(matches!(err, AssistError::IndexUnavailable { .. }));
}

#[tokio::test]
async fn loading_a_scribbled_file_is_index_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.bin");
    std::fs::write(&path, b"this is definitely not an index file").unwrap();

    let err = IndexStore::new(&path).load().unwrap_err();
    assert!(matches!(err, AssistError::IndexUnavailable { .. }));
}

#[tokio::test]
async fn loading_a_truncated_file_is_index_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.bin");
    let embedder = MockEmbedder::new(32);

    let index = sample_index(&embedder).await;
    let store = IndexStore::new(&path);
    store.save(&index).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, AssistError::IndexUnavailable { .. }));
}

#[tokio::test]
async fn saving_replaces_the_previous_file_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.bin");
    let embedder = MockEmbedder::new(32);
    let store = IndexStore::new(&path);

    store.save(&sample_index(&embedder).await).unwrap();

    let second = build_index(
        vec![chunk(0, "only one chunk this time")],
        &embedder,
        2,
        Duration::from_secs(5),
    )
    .await
    .unwrap();
    store.save(&second).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    // No temporary file left behind after the rename.
    assert!(!dir.path().join("index.tmp").exists());
}

#[tokio::test]
async fn rebuilding_from_the_same_documents_is_idempotent() {
    let embedder = MockEmbedder::new(32);
    let first = sample_index(&embedder).await;
    let second = sample_index(&embedder).await;

    let query = embedder.embed("blood pressure").await.unwrap();
    let a = first.search(&query, 3).unwrap();
    let b = second.search(&query, 3).unwrap();

    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.chunk.id, y.chunk.id);
        assert!((x.score - y.score).abs() < 1e-6);
    }
}
