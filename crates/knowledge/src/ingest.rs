//! Building the document index from a directory of text files.

use crate::embedder::Embedder;
use crate::index;
use crate::types::DocChunk;
use paddock_core::{AppError, AppResult};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

pub const DEFAULT_CHUNK_CHARS: usize = 600;
pub const DEFAULT_CHUNK_OVERLAP: usize = 80;

const EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.?!]\s+").expect("valid sentence regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub files: usize,
    pub chunks: usize,
    pub bytes: usize,
}

/// Split on sentence-ending punctuation followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let sentence = text[start..m.start() + 1].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Pack sentences into chunks of at most `max_chars` bytes, carrying the last
/// `overlap` characters of each chunk into the next. A single sentence longer
/// than `max_chars` becomes its own chunk.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut has_new = false;

    for sentence in split_sentences(text) {
        if has_new && current.len() + 1 + sentence.len() > max_chars {
            let tail = overlap_tail(&current, overlap).to_string();
            chunks.push(std::mem::take(&mut current));
            current = tail;
            has_new = false;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
        has_new = true;
    }

    if has_new {
        chunks.push(current);
    }
    chunks
}

fn overlap_tail(text: &str, overlap: usize) -> &str {
    if overlap == 0 {
        return "";
    }
    match text.char_indices().rev().nth(overlap - 1) {
        Some((i, _)) => text[i..].trim_start(),
        None => text,
    }
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Embed every text and markdown file under `dir` into the index at
/// `index_path`.
///
/// Sources are stored relative to `dir`. An index built with another
/// embedder is rejected unless `reset` is set, which clears it first.
pub async fn ingest_dir(
    dir: &Path,
    index_path: &Path,
    embedder: &dyn Embedder,
    reset: bool,
) -> AppResult<IngestStats> {
    if !dir.is_dir() {
        return Err(AppError::Knowledge(format!("Not a directory: {:?}", dir)));
    }

    let conn = index::init_index(index_path)?;

    if reset {
        index::reset_index(&conn)?;
    } else if let Some((name, dims)) = index::stored_embedder(&conn)? {
        if name != embedder.name() || dims != embedder.dimensions() {
            return Err(AppError::Knowledge(format!(
                "Index was built with {} ({} dims); re-run with --reset to rebuild it with {}",
                name,
                dims,
                embedder.name()
            )));
        }
    }
    index::set_embedder(&conn, embedder.name(), embedder.dimensions())?;

    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_document(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();

    let mut stats = IngestStats::default();

    for path in files {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let chunks = chunk_text(&text, DEFAULT_CHUNK_CHARS, DEFAULT_CHUNK_OVERLAP);
        if chunks.is_empty() {
            tracing::debug!("Skipping empty file {:?}", path);
            continue;
        }

        let source = path
            .strip_prefix(dir)
            .unwrap_or(path.as_path())
            .to_string_lossy()
            .replace('\\', "/");
        let embeddings = embedder.embed_batch(&chunks).await?;

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to start transaction: {}", e)))?;
        for (position, (body, embedding)) in chunks.iter().zip(embeddings).enumerate() {
            index::insert_chunk(
                &tx,
                &DocChunk {
                    source: source.clone(),
                    position: position as u32,
                    text: body.clone(),
                    embedding,
                },
            )?;
        }
        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit chunks: {}", e)))?;

        tracing::debug!("Ingested {} ({} chunks)", source, chunks.len());
        stats.files += 1;
        stats.chunks += chunks.len();
        stats.bytes += text.len();
    }

    tracing::info!(
        "Ingested {} files into {} chunks ({} bytes)",
        stats.files,
        stats.chunks,
        stats.bytes
    );
    Ok(stats)
}
