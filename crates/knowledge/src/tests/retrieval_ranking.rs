//! Ranking behavior of the document index and retriever.

use crate::embedder::{Embedder, HashingEmbedder};
use crate::index::{init_index, insert_chunk, query_chunks, set_embedder};
use crate::retriever::{DocumentRetriever, SqliteRetriever};
use crate::types::DocChunk;
use std::sync::Arc;
use tempfile::TempDir;

fn chunk(source: &str, position: u32, text: &str, embedding: Vec<f32>) -> DocChunk {
    DocChunk {
        source: source.to_string(),
        position,
        text: text.to_string(),
        embedding,
    }
}

fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

#[test]
fn test_relevant_chunk_ranks_first() {
    let dir = TempDir::new().unwrap();
    let conn = init_index(&dir.path().join("docs.sqlite")).unwrap();

    insert_chunk(
        &conn,
        &chunk(
            "sporting-regs.pdf",
            0,
            "Cars enter parc ferme at the start of qualifying",
            normalize(&[1.0, 0.5, 0.2, 0.1]),
        ),
    )
    .unwrap();
    insert_chunk(
        &conn,
        &chunk(
            "menu.txt",
            0,
            "Cooking recipes for pasta",
            normalize(&[-0.3, -0.8, 0.4, -0.2]),
        ),
    )
    .unwrap();

    let results = query_chunks(&conn, &normalize(&[0.9, 0.4, 0.3, 0.1]), 5).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.source, "sporting-regs.pdf");
    assert!(results[0].1 > 0.9, "score was {}", results[0].1);
    assert!(results[1].1 < results[0].1);
}

#[test]
fn test_top_k_limits_results() {
    let dir = TempDir::new().unwrap();
    let conn = init_index(&dir.path().join("docs.sqlite")).unwrap();

    for i in 0..10 {
        let embedding = normalize(&[1.0, i as f32 * 0.1, 0.0]);
        insert_chunk(&conn, &chunk("regs.md", i, &format!("chunk {}", i), embedding)).unwrap();
    }

    let results = query_chunks(&conn, &normalize(&[1.0, 0.0, 0.0]), 3).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0.position, 0);
    assert!(results.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[tokio::test]
async fn test_retriever_ranks_by_shared_terms() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("docs.sqlite");
    let embedder = Arc::new(HashingEmbedder::default());

    {
        let conn = init_index(&path).unwrap();
        set_embedder(&conn, embedder.name(), embedder.dimensions()).unwrap();

        let texts = [
            ("tyres.md", "Each driver receives a reduced tyre allocation at sprint weekends."),
            ("safety.md", "The safety car is deployed when marshals need to clear debris."),
            ("kitchen.md", "Cooking recipes for fresh pasta and tomato sauce."),
        ];
        for (i, (source, text)) in texts.iter().enumerate() {
            let embedding = embedder.embed(text).await.unwrap();
            insert_chunk(&conn, &chunk(source, i as u32, text, embedding)).unwrap();
        }
    }

    let retriever = SqliteRetriever::open(&path, embedder).unwrap();
    let passages = retriever
        .retrieve("tyre allocation at sprint weekends", 2)
        .await
        .unwrap();

    assert_eq!(passages.len(), 2);
    assert_eq!(passages[0].source, "tyres.md");
}

#[test]
fn test_retriever_rejects_mismatched_embedder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("docs.sqlite");

    {
        let conn = init_index(&path).unwrap();
        set_embedder(&conn, "trigram-v1", 64).unwrap();
    }

    let result = SqliteRetriever::open(&path, Arc::new(HashingEmbedder::new(128)));
    assert!(result.is_err());
}
