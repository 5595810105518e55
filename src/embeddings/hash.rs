//! FNV-1a hash embedder
//!
//! Deterministic, lexical-only embeddings with no model files and no
//! network. Used for offline runs against a snapshot built with the same
//! embedder, and as the embedder in pipeline tests.

use async_trait::async_trait;

use super::normalize_input;
use super::Embedder;
use crate::errors::Result;
use crate::models::EmbeddingVector;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Tokens shorter than this are ignored
const MIN_TOKEN_LEN: usize = 2;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create a hash embedder; a zero dimension is bumped to one
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Embed without the async wrapper
    pub fn embed_sync(&self, text: &str) -> Result<EmbeddingVector> {
        let normalized = normalize_input(text)?;
        let mut embedding = vec![0.0_f32; self.dimension];

        for token in tokenize(&normalized) {
            let hash = fnv1a_hash(token.to_lowercase().as_bytes());
            let index = (hash as usize) % self.dimension;
            let sign = if (hash >> 63) == 1 { 1.0 } else { -1.0 };
            embedding[index] += sign;
        }

        Ok(EmbeddingVector::new(l2_normalize(&embedding)))
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "fnv1a-hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        self.embed_sync(text)
    }
}

fn fnv1a_hash(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
}

fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm_sq: f32 = vec.iter().map(|x| x * x).sum();
    if !norm_sq.is_finite() || norm_sq < f32::EPSILON {
        return vec.to_vec();
    }
    let norm = norm_sq.sqrt();
    vec.iter().map(|x| x / norm).collect()
}
