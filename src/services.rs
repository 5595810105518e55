//! Service factory: concrete backends from configuration
//!
//! Everything the pipeline talks to is built here once at startup, so a
//! mismatch between the embedder and the index dimension stops the process
//! before the first query.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingClient;
use crate::embeddings::EmbeddingProvider;
use crate::embeddings::HashEmbedder;
use crate::errors::RagError;
use crate::errors::Result;
use crate::llm::ChatCompletionsBackend;
use crate::llm::GenerationClient;
use crate::rag::AnswerFormat;
use crate::rag::QueryPipeline;
use crate::vector_store::MemoryStore;
use crate::vector_store::PineconeStore;
use crate::vector_store::StoreProvider;
use crate::vector_store::VectorStore;

/// Create the configured embedder
pub fn create_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let embeddings = &config.embeddings;
    let embedder: Arc<dyn Embedder> = match embeddings.provider {
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::new(embeddings.dimension)),
        provider => Arc::new(EmbeddingClient::new(
            provider,
            embeddings.model.clone(),
            embeddings.endpoint.clone(),
            embeddings.api_key.clone(),
            embeddings.dimension,
            Duration::from_secs(embeddings.timeout_secs),
        )?),
    };
    info!(
        "🔧 Embedder: {} ({} dims)",
        embedder.name(),
        embedder.dimension()
    );
    Ok(embedder)
}

/// Create the configured vector store client
pub fn create_store(config: &AppConfig) -> Result<Arc<dyn VectorStore>> {
    let store_config = &config.vector_store;
    let dimension = config.embedding_dimension();
    let max_top_k = config.pipeline.max_top_k;

    let store: Arc<dyn VectorStore> = match store_config.provider {
        StoreProvider::Pinecone => {
            Arc::new(PineconeStore::new(store_config, dimension, max_top_k)?)
        }
        StoreProvider::Memory => {
            let path = store_config.snapshot_path.as_deref().ok_or_else(|| {
                RagError::ConfigError(
                    "vector_store.snapshot_path is required for the memory store".to_string(),
                )
            })?;
            Arc::new(MemoryStore::from_path(
                path,
                store_config.metric,
                dimension,
                max_top_k,
            )?)
        }
    };
    info!(
        "🗂️  Vector store: {} ({:?}, {} dims)",
        store.name(),
        store.metric(),
        store.dimension()
    );
    Ok(store)
}

/// Create the generation client with the configured retry policy
pub fn create_generator(config: &AppConfig) -> Result<GenerationClient> {
    let backend = Arc::new(ChatCompletionsBackend::new(&config.llm)?);
    info!(
        "🤖 LLM: {} at {}",
        config.llm_model(),
        config.llm_endpoint()
    );
    Ok(GenerationClient::new(
        backend,
        config.retry_policy()?,
        config.institution(),
    ))
}

/// Fail with `DimensionMismatch` unless embedder and store agree
pub fn check_dimensions(embedder: &dyn Embedder, store: &dyn VectorStore) -> Result<()> {
    if embedder.dimension() == store.dimension() {
        Ok(())
    } else {
        Err(RagError::DimensionMismatch {
            expected: store.dimension(),
            actual: embedder.dimension(),
        })
    }
}

/// Build the complete query pipeline from configuration
///
/// # Errors
/// - Invalid configuration
/// - Unreadable or inconsistent memory-store snapshot
/// - Embedder and store dimensions disagree
pub fn build_pipeline(config: &AppConfig, format: AnswerFormat) -> Result<QueryPipeline> {
    let embedder = create_embedder(config)?;
    let store = create_store(config)?;
    check_dimensions(embedder.as_ref(), store.as_ref())?;
    let generator = create_generator(config)?;

    Ok(QueryPipeline::new(
        embedder,
        store,
        generator,
        config.pipeline_config(format),
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn memory_config(snapshot: &std::path::Path, dimension: usize) -> AppConfig {
        let mut config = AppConfig::default();
        config.embeddings.provider = EmbeddingProvider::Hash;
        config.embeddings.dimension = dimension;
        config.vector_store.provider = StoreProvider::Memory;
        config.vector_store.snapshot_path = Some(snapshot.display().to_string());
        config
    }

    fn snapshot(dimension: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let vector = vec![0.5_f32; dimension];
        let body = serde_json::json!([
            {"id": "d1", "text": "GIKI campus", "metadata": {}, "vector": vector}
        ]);
        write!(file, "{body}").unwrap();
        file
    }

    #[test]
    fn test_build_pipeline_from_snapshot() {
        let file = snapshot(8);
        let config = memory_config(file.path(), 8);
        let pipeline = build_pipeline(&config, AnswerFormat::Plain).unwrap();
        assert_eq!(pipeline.config().format, AnswerFormat::Plain);
    }

    #[test]
    fn test_snapshot_with_wrong_dimension_is_fatal() {
        let file = snapshot(4);
        let config = memory_config(file.path(), 8);
        assert!(matches!(
            build_pipeline(&config, AnswerFormat::Html),
            Err(RagError::DimensionMismatch {
                expected: 8,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_check_dimensions() {
        let file = snapshot(8);
        let config = memory_config(file.path(), 8);
        let store = create_store(&config).unwrap();

        assert!(check_dimensions(&HashEmbedder::new(8), store.as_ref()).is_ok());
        assert!(matches!(
            check_dimensions(&HashEmbedder::new(16), store.as_ref()),
            Err(RagError::DimensionMismatch {
                expected: 8,
                actual: 16
            })
        ));
    }
}
