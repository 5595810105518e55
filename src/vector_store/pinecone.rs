//! Pinecone-style HTTP query client

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::clamp_top_k;
use super::Metric;
use super::VectorStore;
use crate::config::VectorStoreConfig;
use crate::errors::RagError;
use crate::errors::Result;
use crate::models::rank_matches;
use crate::models::Document;
use crate::models::EmbeddingVector;
use crate::models::Match;
use crate::models::MetadataValue;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Deserialize)]
struct RawMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
}

/// Read-only client for a hosted vector index
pub struct PineconeStore {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    namespace: Option<String>,
    metric: Metric,
    text_field: String,
    dimension: usize,
    max_top_k: usize,
}

impl PineconeStore {
    /// Create a store client from the `[vector_store]` section
    pub fn new(config: &VectorStoreConfig, dimension: usize, max_top_k: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RagError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            namespace: config.namespace.clone(),
            metric: config.metric,
            text_field: config.text_field.clone(),
            dimension,
            max_top_k,
        })
    }

    fn to_match(&self, raw: RawMatch) -> Option<Match> {
        let RawMatch {
            id,
            score,
            mut metadata,
        } = raw;

        let text = match metadata.remove(&self.text_field) {
            Some(serde_json::Value::String(text)) if !text.trim().is_empty() => text,
            _ => {
                warn!("Skipping match {} without '{}' metadata", id, self.text_field);
                return None;
            }
        };

        let metadata = metadata
            .into_iter()
            .filter_map(|(key, value)| scalar(value).map(|v| (key, v)))
            .collect();

        Some(Match::new(
            Document { id, text, metadata },
            self.metric.similarity(score),
        ))
    }
}

fn scalar(value: serde_json::Value) -> Option<MetadataValue> {
    match value {
        serde_json::Value::Bool(b) => Some(MetadataValue::Bool(b)),
        serde_json::Value::Number(n) => n.as_f64().map(MetadataValue::Number),
        serde_json::Value::String(s) => Some(MetadataValue::Text(s)),
        _ => None,
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    fn name(&self) -> &str {
        "pinecone"
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

        let url = format!("{}/query", self.endpoint);
        debug!("Querying vector store: {} (top_k={})", url, top_k);

        let request = QueryRequest {
            vector: vector.as_slice(),
            top_k,
            include_metadata: true,
            namespace: self.namespace.as_deref(),
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Api-Key", api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RagError::StoreUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::StoreUnavailable(format!(
                "vector store error ({status}): {error_text}"
            )));
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| RagError::StoreUnavailable(format!("Failed to parse response: {e}")))?;

        let mut matches: Vec<Match> = result
            .matches
            .into_iter()
            .filter_map(|raw| self.to_match(raw))
            .take(top_k)
            .collect();
        rank_matches(&mut matches);

        debug!("Vector store returned {} matches", matches.len());
        Ok(matches)
    }
}
