// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic hash-based fallback embedder.
//!
//! Maps text to an L2-normalized pseudo-random vector seeded from the
//! SHA-256 of the cleaned text. Not semantically meaningful, but
//! deterministic and fast, so the whole engine runs with no external
//! embedding model configured: identical texts collide exactly and ranking
//! stays stable.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use mnemo_core::error::MnemoError;
use mnemo_core::traits::EmbeddingAdapter;
use mnemo_core::types::EmbeddingVector;

/// Minimum allowed dimensionality for the fallback embedder.
const MIN_DIMS: usize = 32;

/// Dependency-free fallback embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dims: usize,
    model: String,
}

impl HashEmbedder {
    /// Creates a hash embedder with the given dimensionality (floored at 32).
    pub fn new(dims: usize) -> Self {
        Self {
            dims: dims.max(MIN_DIMS),
            model: "local-hash-v1".to_string(),
        }
    }

    /// Embed synchronously; exposed for tests and non-async callers.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let clean = text.trim().to_lowercase();
        let digest = Sha256::digest(clean.as_bytes());
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        let mut rng = StdRng::seed_from_u64(u64::from_be_bytes(seed_bytes));
        let mut vec: Vec<f32> = (0..self.dims).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl EmbeddingAdapter for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, MnemoError> {
        Ok(EmbeddingVector {
            vector: self.embed_text(text),
            model: self.model.clone(),
            provider: "local".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::cosine_similarity;

    #[test]
    fn deterministic_for_identical_text() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_text("I prefer dark roast coffee");
        let b = embedder.embed_text("I prefer dark roast coffee");
        assert_eq!(a, b);
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_text("  Hello World ");
        let b = embedder.embed_text("hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_text_differs() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_text("coffee");
        let b = embedder.embed_text("tea");
        assert_ne!(a, b);
        assert!(cosine_similarity(&a, &b) < 0.99);
    }

    #[test]
    fn output_is_unit_length() {
        let embedder = HashEmbedder::new(128);
        let v = embedder.embed_text("normalize me");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn dims_floor_applies() {
        let embedder = HashEmbedder::new(4);
        assert_eq!(embedder.embed_text("x").len(), 32);
    }

    #[tokio::test]
    async fn adapter_reports_model_identity() {
        let embedder = HashEmbedder::new(64);
        let out = embedder.embed("hello").await.unwrap();
        assert_eq!(out.model, "local-hash-v1");
        assert_eq!(out.provider, "local");
        assert_eq!(out.vector.len(), 64);
    }
}
