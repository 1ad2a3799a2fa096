//! Core data types that flow through the load and chat pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw text read from one file.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: PathBuf,
    pub body: String,
}

/// A bounded slice of a document's text.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    /// Path of the originating document, for provenance only.
    pub source: PathBuf,
    pub chunk_index: usize,
    pub text: String,
    pub hash: String,
}

/// A retrieved chunk with its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// One exchange in the visible transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}
