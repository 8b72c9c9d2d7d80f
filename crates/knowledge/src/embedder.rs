//! Query embedding.

use paddock_core::{AppError, AppResult};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_DIMENSIONS: usize = 384;

/// Turns text into vectors comparable with the stored index.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Model identifier, recorded in the index at ingestion time.
    fn name(&self) -> &str;

    fn dimensions(&self) -> usize;

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Deterministic embedder hashing word trigrams into a fixed-size vector.
///
/// Content-dependent but not semantic; shared terms between query and
/// passage drive the score.
#[derive(Debug)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        const STOP_WORDS: [&str; 24] = [
            "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to",
            "of", "in", "and", "or", "but", "with", "by", "from", "this", "that", "what",
        ];
        let stop_words: HashSet<&str> = STOP_WORDS.into_iter().collect();

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        let mut embedding = vec![0.0_f32; self.dimensions];
        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let dim = (hash(&trigram, 37) as usize) % self.dimensions;
                embedding[dim] += (*freq as f32).sqrt();
            }

            let dim = (hash(word, 31) as usize) % self.dimensions;
            embedding[dim] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }
        embedding
    }
}

fn hash(s: &str, multiplier: u64) -> u64 {
    s.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64))
}

#[async_trait::async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cosine_similarity;

    #[tokio::test]
    async fn test_unit_length_and_dimensions() {
        let embedder = HashingEmbedder::new(128);
        let embedding = embedder.embed("Safety car deployment rules").await.unwrap();
        assert_eq!(embedding.len(), 128);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("parc ferme").await.unwrap();
        let b = embedder.embed("parc ferme").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::default();
        let embedding = embedder.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_shared_terms_score_higher() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed("tyre allocation for sprint weekends").await.unwrap();
        let related = embedder
            .embed("Each driver receives a reduced tyre allocation at sprint weekends.")
            .await
            .unwrap();
        let unrelated = embedder
            .embed("Cooking recipes for fresh pasta")
            .await
            .unwrap();
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }
}
