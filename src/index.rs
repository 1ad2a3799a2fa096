//! In-memory embedding index.
//!
//! An [`EmbeddingIndex`] is built in one go from a list of chunks and is
//! immutable afterwards. Lookups are brute-force cosine similarity over
//! every stored vector, which is plenty for a handful of uploaded files.

use tracing::debug;

use crate::embedding::{cosine_similarity, EmbeddingProvider};
use crate::error::ChatError;
use crate::models::{Chunk, ScoredChunk};

struct IndexedChunk {
    chunk: Chunk,
    vector: Vec<f32>,
}

pub struct EmbeddingIndex {
    entries: Vec<IndexedChunk>,
    model: String,
    dims: usize,
}

impl EmbeddingIndex {
    /// Embed `chunks` in batches of `batch_size` and build a fresh index.
    ///
    /// # Errors
    ///
    /// - [`ChatError::EmptyInput`] when `chunks` is empty.
    /// - [`ChatError::Embedding`] when the provider fails, returns the wrong
    ///   number of vectors, or returns vectors of differing dimensionality.
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        chunks: Vec<Chunk>,
        batch_size: usize,
    ) -> Result<Self, ChatError> {
        if chunks.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let batch_vectors = provider
                .embed(&texts)
                .await
                .map_err(|e| ChatError::embedding(format!("{:#}", e)))?;
            if batch_vectors.len() != texts.len() {
                return Err(ChatError::embedding(format!(
                    "expected {} vectors, got {}",
                    texts.len(),
                    batch_vectors.len()
                )));
            }
            debug!(batch = texts.len(), "embedded chunk batch");
            vectors.extend(batch_vectors);
        }

        let dims = vectors.first().map(Vec::len).unwrap_or(0);
        if dims == 0 || vectors.iter().any(|v| v.len() != dims) {
            return Err(ChatError::embedding(
                "provider returned vectors of inconsistent dimensionality",
            ));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedChunk { chunk, vector })
            .collect();

        Ok(Self {
            entries,
            model: provider.model_name().to_string(),
            dims,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Return the `k` chunks most similar to `query_vec`, nearest first.
    /// Equal scores keep their insertion order.
    pub fn nearest(&self, query_vec: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query_vec, &e.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect()
    }
}
