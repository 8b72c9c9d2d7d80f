//! SQLite-backed vector index for document chunks.
//!
//! Written by `ingest` and opened read-only at answer time. Embeddings are
//! stored as little-endian `f32` blobs.

use crate::types::DocChunk;
use paddock_core::{AppError, AppResult};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// Initialize (or open for writing) an index database.
pub fn init_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source);
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Initialized SQLite index at {:?}", db_path);
    Ok(conn)
}

/// Open an existing index read-only.
pub fn open_index(db_path: &Path) -> AppResult<Connection> {
    if !db_path.exists() {
        return Err(AppError::Knowledge(format!(
            "No document index at {:?}. Build one with `paddock ingest <dir>` first.",
            db_path
        )));
    }

    Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))
}

/// Record which embedder produced the stored vectors.
pub fn set_embedder(conn: &Connection, name: &str, dimensions: usize) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('embedder', ?1), ('dimensions', ?2)",
        params![name, dimensions.to_string()],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to write index metadata: {}", e)))?;
    Ok(())
}

/// Embedder name and dimensions recorded in the index, if any.
pub fn stored_embedder(conn: &Connection) -> AppResult<Option<(String, usize)>> {
    let read = |key: &str| -> AppResult<Option<String>> {
        conn.query_row("SELECT value FROM meta WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| AppError::Knowledge(format!("Failed to read index metadata: {}", e)))
    };

    match (read("embedder")?, read("dimensions")?) {
        (Some(name), Some(dims)) => {
            let dims = dims.parse().map_err(|_| {
                AppError::Knowledge(format!("Invalid dimensions in index metadata: {}", dims))
            })?;
            Ok(Some((name, dims)))
        }
        _ => Ok(None),
    }
}

/// Delete every stored chunk and the embedder record.
pub fn reset_index(conn: &Connection) -> AppResult<()> {
    conn.execute_batch("DELETE FROM chunks; DELETE FROM meta;")
        .map_err(|e| AppError::Knowledge(format!("Failed to reset index: {}", e)))?;
    tracing::info!("Reset document index");
    Ok(())
}

/// Insert a chunk with its embedding.
pub fn insert_chunk(conn: &Connection, chunk: &DocChunk) -> AppResult<()> {
    conn.execute(
        "INSERT INTO chunks (source, position, text, embedding) VALUES (?1, ?2, ?3, ?4)",
        params![
            chunk.source,
            chunk.position as i64,
            chunk.text,
            embedding_to_bytes(&chunk.embedding),
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;

    Ok(())
}

/// Top-k chunks by cosine similarity, best first.
pub fn query_chunks(
    conn: &Connection,
    query_embedding: &[f32],
    top_k: usize,
) -> AppResult<Vec<(DocChunk, f32)>> {
    let mut stmt = conn
        .prepare("SELECT source, position, text, embedding FROM chunks")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            let embedding_bytes: Vec<u8> = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                embedding_bytes,
            ))
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

    let mut results = Vec::new();
    for row in rows {
        let (source, position, text, bytes) =
            row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk: {}", e)))?;
        let embedding = bytes_to_embedding(&bytes)?;
        let score = cosine_similarity(query_embedding, &embedding);
        results.push((
            DocChunk {
                source,
                position: position as u32,
                text,
                embedding,
            },
            score,
        ));
    }

    results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);

    tracing::debug!(
        "Retrieved {} chunks (requested top-{})",
        results.len(),
        top_k
    );

    Ok(results)
}

/// Number of stored chunks.
pub fn chunk_count(conn: &Connection) -> AppResult<u32> {
    conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| {
        row.get::<_, i64>(0).map(|v| v as u32)
    })
    .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Cosine similarity; mismatched or zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_and_count() {
        let dir = TempDir::new().unwrap();
        let conn = init_index(&dir.path().join("nested/docs.sqlite")).unwrap();
        assert_eq!(chunk_count(&conn).unwrap(), 0);

        insert_chunk(
            &conn,
            &DocChunk {
                source: "regs.md".to_string(),
                position: 0,
                text: "Parc ferme rules".to_string(),
                embedding: vec![1.0, 0.0, 0.0],
            },
        )
        .unwrap();
        assert_eq!(chunk_count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_embedding_bytes_round_trip() {
        let original = vec![0.25_f32, -1.5, 3.0];
        let bytes = embedding_to_bytes(&original);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), original);
        assert!(bytes_to_embedding(&bytes[..5]).is_err());
    }

    #[test]
    fn test_embedder_metadata() {
        let dir = TempDir::new().unwrap();
        let conn = init_index(&dir.path().join("docs.sqlite")).unwrap();
        assert_eq!(stored_embedder(&conn).unwrap(), None);

        set_embedder(&conn, "trigram-v1", 384).unwrap();
        assert_eq!(
            stored_embedder(&conn).unwrap(),
            Some(("trigram-v1".to_string(), 384))
        );
    }

    #[test]
    fn test_reset_clears_chunks_and_metadata() {
        let dir = TempDir::new().unwrap();
        let conn = init_index(&dir.path().join("docs.sqlite")).unwrap();
        set_embedder(&conn, "trigram-v1", 3).unwrap();
        insert_chunk(
            &conn,
            &DocChunk {
                source: "regs.md".to_string(),
                position: 0,
                text: "Parc ferme rules".to_string(),
                embedding: vec![1.0, 0.0, 0.0],
            },
        )
        .unwrap();

        reset_index(&conn).unwrap();
        assert_eq!(chunk_count(&conn).unwrap(), 0);
        assert_eq!(stored_embedder(&conn).unwrap(), None);
    }

    #[test]
    fn test_open_missing_index() {
        let dir = TempDir::new().unwrap();
        assert!(open_index(&dir.path().join("absent.sqlite")).is_err());
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
