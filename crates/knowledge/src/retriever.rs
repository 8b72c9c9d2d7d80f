//! Document retrieval over the persisted vector index.

use crate::embedder::Embedder;
use crate::index;
use crate::types::Passage;
use async_trait::async_trait;
use paddock_core::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Returns the passages closest to a query, best first.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> AppResult<Vec<Passage>>;
}

pub struct SqliteRetriever {
    conn: Mutex<Connection>,
    embedder: Arc<dyn Embedder>,
}

impl SqliteRetriever {
    /// Open an index read-only. Fails if the index was built with a
    /// different embedder.
    pub fn open(path: &Path, embedder: Arc<dyn Embedder>) -> AppResult<Self> {
        let conn = index::open_index(path)?;

        if let Some((name, dims)) = index::stored_embedder(&conn)? {
            if name != embedder.name() || dims != embedder.dimensions() {
                return Err(AppError::Knowledge(format!(
                    "Index was built with {} ({} dims), but the query embedder is {} ({} dims)",
                    name,
                    dims,
                    embedder.name(),
                    embedder.dimensions()
                )));
            }
        }

        tracing::debug!(
            "Opened document index {:?} ({} chunks)",
            path,
            index::chunk_count(&conn)?
        );

        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }
}

#[async_trait]
impl DocumentRetriever for SqliteRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> AppResult<Vec<Passage>> {
        let query_embedding = self.embedder.embed(query).await?;

        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Knowledge("Index connection lock poisoned".to_string()))?;
        let results = index::query_chunks(&conn, &query_embedding, k)?;

        Ok(results
            .into_iter()
            .map(|(chunk, score)| Passage {
                text: chunk.text,
                source: chunk.source,
                score,
            })
            .collect())
    }
}
