//! Local document knowledge for Paddock.
//!
//! Ingestion of text documents into a SQLite vector index, retrieval over
//! it, and answers grounded strictly in the retrieved passages.

pub mod answer;
pub mod embedder;
pub mod index;
pub mod ingest;
pub mod retriever;
pub mod types;

#[cfg(test)]
mod tests;

pub use answer::{answer_local, build_context, DEFAULT_TOP_K};
pub use embedder::{Embedder, HashingEmbedder};
pub use ingest::{chunk_text, ingest_dir, split_sentences, IngestStats};
pub use retriever::{DocumentRetriever, SqliteRetriever};
pub use types::{DocChunk, DocCitation, LocalAnswer, Passage};
