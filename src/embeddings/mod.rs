//! Embeddings generation module
//!
//! This module turns question text into fixed-dimensionality vectors:
//! - OpenAI-compatible embedding endpoints
//! - Ollama (local models)
//! - A deterministic hash embedder for offline runs and tests
//!
//! # Examples
//!
//! ```rust,no_run
//! use gikirag::embeddings::{Embedder, HashEmbedder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let embedder = HashEmbedder::new(384);
//!     let embedding = embedder.embed("Which programs does GIKI offer?").await?;
//!     println!("Generated embedding with {} dimensions", embedding.dimension());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod hash;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use client::EmbeddingClient;
pub use hash::HashEmbedder;

use crate::errors::Result;
use crate::errors::RagError;
use crate::models::EmbeddingVector;

/// Default embedding dimension (all-MiniLM-L6-v2 family)
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// `OpenAI`-compatible embeddings API
    OpenAI,
    /// Ollama local embeddings
    Ollama,
    /// Local FNV-1a hash embeddings, no network
    Hash,
}

/// Capability: turn text into an embedding vector.
///
/// Implementations must be deterministic for a given model version and
/// reject input that is empty after whitespace normalisation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Dimensionality of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<EmbeddingVector>;
}

/// Collapse whitespace runs and trim; empty results are invalid input
pub fn normalize_input(text: &str) -> Result<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(RagError::InvalidInput(
            "text to embed must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}
