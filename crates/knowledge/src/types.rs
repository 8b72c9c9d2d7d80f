//! Core types for document retrieval and local answers.

use serde::{Deserialize, Serialize};

/// A stored chunk of a source document with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct DocChunk {
    /// Source document name or path (e.g., "regulations-2024.pdf")
    pub source: String,

    /// Position of the chunk within its source
    pub position: u32,

    pub text: String,

    pub embedding: Vec<f32>,
}

/// A retrieved passage, best match first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub source: String,
    /// Cosine similarity to the query, -1.0 to 1.0
    pub score: f32,
}

/// A numbered reference to a passage used in the answer context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocCitation {
    /// 1-based index matching the `[#]` markers in the answer
    pub index: usize,
    pub source: String,
}

/// Answer produced strictly from retrieved passages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalAnswer {
    pub text: String,
    pub citations: Vec<DocCitation>,
}

impl LocalAnswer {
    /// Answer used when retrieval finds nothing; no model call is made.
    pub fn no_information(question: &str) -> Self {
        Self {
            text: format!(
                "I could not find information about \"{}\" in the local documents.",
                question
            ),
            citations: Vec::new(),
        }
    }
}
