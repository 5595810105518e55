//! Similarity search against the pre-built vector index
//!
//! The index itself is built elsewhere; this module only queries it.
//! [`PineconeStore`] talks to a hosted index over HTTP and [`MemoryStore`]
//! serves a JSON snapshot from memory.

pub mod memory;
pub mod pinecone;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

pub use memory::MemoryStore;
pub use pinecone::PineconeStore;

use crate::errors::RagError;
use crate::errors::Result;
use crate::models::EmbeddingVector;
use crate::models::Match;

/// Upper bound on `top_k` when nothing else is configured
pub const DEFAULT_MAX_TOP_K: usize = 50;

/// Supported vector store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    Pinecone,
    Memory,
}

/// Similarity metric the index was built with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
}

impl Metric {
    /// Map a raw store score onto "higher is closer"
    ///
    /// Cosine scores already increase with similarity. Euclidean scores are
    /// distances and become `1 / (1 + d)`.
    pub fn similarity(self, raw: f32) -> f32 {
        match self {
            Self::Cosine => raw,
            Self::Euclidean => 1.0 / (1.0 + raw.max(0.0)),
        }
    }
}

/// Capability: rank indexed documents by similarity to a query vector
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Dimensionality the index was built with
    fn dimension(&self) -> usize;

    fn metric(&self) -> Metric;

    /// Return up to `top_k` matches, best first
    ///
    /// An empty vec means "no results"; transport and auth failures are
    /// `StoreUnavailable`.
    async fn search(&self, vector: &EmbeddingVector, top_k: usize) -> Result<Vec<Match>>;
}

/// Validate `top_k`: zero is rejected, values above `max_top_k` are clamped
pub fn clamp_top_k(top_k: usize, max_top_k: usize) -> Result<usize> {
    if top_k == 0 {
        return Err(RagError::InvalidInput(
            "top_k must be a positive integer".to_string(),
        ));
    }
    if top_k > max_top_k {
        warn!("top_k {} exceeds limit, clamping to {}", top_k, max_top_k);
        return Ok(max_top_k);
    }
    Ok(top_k)
}
