//! Core data types shared by the query pipeline

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Scalar metadata value attached to a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A passage from the crawled corpus, immutable once indexed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Source URL recorded by the crawler, if any
    pub fn source_url(&self) -> Option<&str> {
        match self.metadata.get("url") {
            Some(MetadataValue::Text(url)) => Some(url),
            _ => None,
        }
    }
}

/// Fixed-length embedding produced by an [`crate::embeddings::Embedder`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Fail with `DimensionMismatch` unless the vector has `expected` entries
    pub fn ensure_dimension(&self, expected: usize) -> crate::Result<()> {
        if self.dimension() == expected {
            Ok(())
        } else {
            Err(crate::RagError::DimensionMismatch {
                expected,
                actual: self.dimension(),
            })
        }
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// A ranked search hit; higher score means closer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub document: Document,
    pub score: f32,
}

impl Match {
    pub fn new(document: Document, score: f32) -> Self {
        Self { document, score }
    }
}

/// Sort matches descending by score; equal scores keep store order
pub fn rank_matches(matches: &mut [Match]) {
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
}
