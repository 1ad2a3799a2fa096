//! Offline feature-hashing embedder.
//!
//! Each lower-cased alphanumeric token is hashed with SHA-256 into one of
//! `dims` buckets with a ±1 sign taken from the hash, and the resulting
//! vector is L2-normalized. Texts sharing words land close together under
//! cosine similarity, which is enough for small document sets and makes
//! runs fully reproducible.

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;

const DEFAULT_DIMS: usize = 256;

pub struct HashProvider {
    dims: usize,
}

impl HashProvider {
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            dims: config.dims.unwrap_or(DEFAULT_DIMS).max(1),
        }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dims];

        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.as_bytes());
            let mut word = [0u8; 8];
            word.copy_from_slice(&digest[..8]);
            let h = u64::from_le_bytes(word);
            let bucket = (h % self.dims as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign;
        }

        let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in &mut vec {
                *x /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl EmbeddingProvider for HashProvider {
    fn model_name(&self) -> &str {
        "feature-hash"
    }
    fn dims(&self) -> usize {
        self.dims
    }
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    fn provider(dims: usize) -> HashProvider {
        HashProvider::new(&EmbeddingConfig {
            provider: "hash".to_string(),
            dims: Some(dims),
            ..EmbeddingConfig::default()
        })
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let p = provider(64);
        let a = p.embed_one("The price for 100 units of Product Y is $50");
        let b = p.embed_one("The price for 100 units of Product Y is $50");
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let p = provider(64);
        assert_eq!(p.embed_one("Deliver within 3 days."), p.embed_one("deliver WITHIN 3 days"));
    }

    #[test]
    fn test_shared_words_score_higher() {
        let p = provider(256);
        let query = p.embed_one("how much for 150 units of Product Y");
        let related = p.embed_one("the price for 100 units of Product Y is $50");
        let unrelated = p.embed_one("our office is closed on public holidays");
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let p = provider(16);
        assert!(p.embed_one("  ...  ").iter().all(|x| *x == 0.0));
    }
}
