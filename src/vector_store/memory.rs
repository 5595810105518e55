//! In-memory store over a JSON snapshot of the index

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::clamp_top_k;
use super::Metric;
use super::VectorStore;
use crate::errors::RagError;
use crate::errors::Result;
use crate::models::rank_matches;
use crate::models::Document;
use crate::models::EmbeddingVector;
use crate::models::Match;

/// One snapshot record: the crawled document plus its precomputed vector
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotEntry {
    #[serde(flatten)]
    pub document: Document,
    pub vector: Vec<f32>,
}

/// Brute-force similarity search over a loaded snapshot.
///
/// Entries never change after construction, so concurrent searches share
/// the store without locking.
pub struct MemoryStore {
    entries: Vec<(Document, EmbeddingVector)>,
    metric: Metric,
    dimension: usize,
    max_top_k: usize,
}

impl MemoryStore {
    /// Build a store, rejecting any entry whose vector has the wrong dimension
    pub fn from_entries(
        entries: Vec<SnapshotEntry>,
        metric: Metric,
        dimension: usize,
        max_top_k: usize,
    ) -> Result<Self> {
        let entries = entries
            .into_iter()
            .map(|entry| {
                let vector = EmbeddingVector::new(entry.vector);
                vector.ensure_dimension(dimension)?;
                Ok((entry.document, vector))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            entries,
            metric,
            dimension,
            max_top_k,
        })
    }

    /// Load a snapshot file (a JSON array of entries)
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        metric: Metric,
        dimension: usize,
        max_top_k: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RagError::ConfigError(format!("cannot read snapshot {}: {e}", path.display()))
        })?;
        let entries: Vec<SnapshotEntry> = serde_json::from_str(&content)?;
        let store = Self::from_entries(entries, metric, dimension, max_top_k)?;

        info!(
            "Loaded {} documents from snapshot {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn score(&self, query: &[f32], candidate: &[f32]) -> f32 {
        match self.metric {
            Metric::Cosine => cosine_similarity(query, candidate),
            Metric::Euclidean => self.metric.similarity(euclidean_distance(query, candidate)),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = na * nb;
    if denom < f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[async_trait]
impl VectorStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    async fn search(&self, vector: &EmbeddingVector, top_k: usize) -> Result<Vec<Match>> {
        vector.ensure_dimension(self.dimension)?;
        let top_k = clamp_top_k(top_k, self.max_top_k)?;

        let mut matches: Vec<Match> = self
            .entries
            .iter()
            .map(|(document, candidate)| {
                Match::new(
                    document.clone(),
                    self.score(vector.as_slice(), candidate.as_slice()),
                )
            })
            .collect();
        rank_matches(&mut matches);
        matches.truncate(top_k);

        Ok(matches)
    }
}
