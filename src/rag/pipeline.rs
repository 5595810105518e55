//! Complete query pipeline: Embed -> Search -> Assemble -> Generate -> Format

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::warn;
use uuid::Uuid;

use super::format::format_answer;
use super::format::AnswerFormat;
use super::ContextAssembler;
use crate::embeddings::Embedder;
use crate::errors::RagError;
use crate::llm::FailureKind;
use crate::llm::GenerationClient;
use crate::llm::GenerationFailure;
use crate::llm::GenerationRequest;
use crate::vector_store::clamp_top_k;
use crate::vector_store::VectorStore;
use crate::vector_store::DEFAULT_MAX_TOP_K;

/// Immutable tuning for one pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub per_match_limit: usize,
    pub total_limit: usize,
    pub max_output_tokens: u32,
    pub no_results_message: String,
    pub format: AnswerFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            max_top_k: DEFAULT_MAX_TOP_K,
            per_match_limit: 800,
            total_limit: 2000,
            max_output_tokens: 512,
            no_results_message:
                "Sorry, I couldn't find any information about that in the knowledge base."
                    .to_string(),
            format: AnswerFormat::Html,
        }
    }
}

/// Formatted answer ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    /// Source URLs of the passages the answer was grounded on
    pub sources: Vec<String>,
}

/// Stable failure codes surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidInput,
    EmbeddingUnavailable,
    StoreUnavailable,
    GenerationFailed,
    RetriesExhausted,
    Configuration,
    Cancelled,
}

impl ErrorCode {
    /// Short, generic message safe to show to end users
    pub fn user_message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Please enter a question.",
            Self::EmbeddingUnavailable => {
                "The search service is temporarily unavailable. Please try again later."
            }
            Self::StoreUnavailable => {
                "The knowledge base is temporarily unavailable. Please try again later."
            }
            Self::GenerationFailed => "Sorry, I couldn't generate an answer. Please try again.",
            Self::RetriesExhausted => {
                "The answer service is busy right now. Please try again in a moment."
            }
            Self::Configuration => "The service is misconfigured. Please contact the administrator.",
            Self::Cancelled => "The request was cancelled before an answer was ready.",
        }
    }
}

/// A failed query, carrying only what the caller may see
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{}", .code.user_message())]
pub struct QueryFailure {
    pub code: ErrorCode,
}

impl QueryFailure {
    pub const fn new(code: ErrorCode) -> Self {
        Self { code }
    }

    pub fn message(&self) -> &'static str {
        self.code.user_message()
    }

    /// Classify an embedding-stage error
    fn from_embedding(err: &RagError) -> Self {
        let code = match err {
            RagError::InvalidInput(_) => ErrorCode::InvalidInput,
            e if e.is_configuration() => ErrorCode::Configuration,
            _ => ErrorCode::EmbeddingUnavailable,
        };
        error!("Embedding failed ({:?}): {}", code, err);
        Self::new(code)
    }

    /// Classify a search-stage error
    fn from_search(err: &RagError) -> Self {
        let code = match err {
            RagError::InvalidInput(_) => ErrorCode::InvalidInput,
            e if e.is_configuration() => ErrorCode::Configuration,
            _ => ErrorCode::StoreUnavailable,
        };
        error!("Similarity search failed ({:?}): {}", code, err);
        Self::new(code)
    }
}

impl From<GenerationFailure> for QueryFailure {
    fn from(failure: GenerationFailure) -> Self {
        let code = match failure.kind {
            FailureKind::Cancelled => ErrorCode::Cancelled,
            FailureKind::RetriesExhausted => ErrorCode::RetriesExhausted,
            FailureKind::Fatal => ErrorCode::GenerationFailed,
        };
        Self::new(code)
    }
}

/// Wire shape consumed by the web layer: `{answer}` or `{error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Answer { answer: String },
    Error { error: String },
}

impl From<std::result::Result<Answer, QueryFailure>> for QueryResponse {
    fn from(result: std::result::Result<Answer, QueryFailure>) -> Self {
        match result {
            Ok(answer) => Self::Answer {
                answer: answer.text,
            },
            Err(failure) => Self::Error {
                error: failure.message().to_string(),
            },
        }
    }
}

/// End-to-end question answering over the shared backends.
///
/// Holds no per-query state, so one instance serves concurrent queries.
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    generator: GenerationClient,
    config: Arc<PipelineConfig>,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: GenerationClient,
        config: PipelineConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            generator,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Answer a question, using the configured default `top_k` when `None`
    pub async fn process_query(
        &self,
        question: &str,
        top_k: Option<usize>,
    ) -> std::result::Result<Answer, QueryFailure> {
        self.process_query_with_cancel(question, top_k, &CancellationToken::new())
            .await
    }

    /// Answer a question, stopping early once `cancel` fires
    #[instrument(skip(self, question, cancel), fields(query_id = %Uuid::new_v4()))]
    pub async fn process_query_with_cancel(
        &self,
        question: &str,
        top_k: Option<usize>,
        cancel: &CancellationToken,
    ) -> std::result::Result<Answer, QueryFailure> {
        let question = question.trim();
        if question.is_empty() {
            warn!("Rejected empty question");
            return Err(QueryFailure::new(ErrorCode::InvalidInput));
        }
        info!("Processing query: {}", question);

        let top_k = clamp_top_k(
            top_k.unwrap_or(self.config.default_top_k),
            self.config.max_top_k,
        )
        .map_err(|e| QueryFailure::from_search(&e))?;

        if cancel.is_cancelled() {
            return Err(QueryFailure::new(ErrorCode::Cancelled));
        }

        // Step 1: Embed the question
        debug!("Step 1: Embedding question via {}", self.embedder.name());
        let vector = self
            .embedder
            .embed(question)
            .await
            .map_err(|e| QueryFailure::from_embedding(&e))?;

        // Step 2: Similarity search
        debug!("Step 2: Searching {} (top_k={})", self.store.name(), top_k);
        let matches = self
            .store
            .search(&vector, top_k)
            .await
            .map_err(|e| QueryFailure::from_search(&e))?;
        debug!("Retrieved {} matches", matches.len());

        // Step 3: Assemble context
        let context = ContextAssembler::new(self.config.per_match_limit, self.config.total_limit)
            .assemble(&matches);
        if context.is_empty() {
            info!("No relevant passages found; returning canned answer");
            return Ok(self.no_results());
        }
        debug!(
            "Step 3: Assembled {} fragments ({} chars)",
            context.len(),
            context.total_chars()
        );
        let sources = context.sources();

        // Step 4: Generate
        let completion = self
            .generator
            .generate_with_cancel(
                GenerationRequest {
                    context,
                    question: question.to_string(),
                    max_output_tokens: self.config.max_output_tokens,
                },
                cancel,
            )
            .await?;

        info!(
            "Query answered in {} attempt(s) from {} context chars",
            completion.attempts, completion.context_chars
        );

        Ok(Answer {
            text: format_answer(&completion.text, self.config.format),
            sources,
        })
    }

    fn no_results(&self) -> Answer {
        Answer {
            text: format_answer(&self.config.no_results_message, self.config.format),
            sources: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_serialize_snake_case() {
        let json = serde_json::to_string(&ErrorCode::RetriesExhausted).unwrap();
        assert_eq!(json, "\"retries_exhausted\"");
        let json = serde_json::to_string(&ErrorCode::StoreUnavailable).unwrap();
        assert_eq!(json, "\"store_unavailable\"");
    }

    #[test]
    fn test_generation_failure_mapping() {
        let failure = GenerationFailure {
            kind: FailureKind::RetriesExhausted,
            retriable: true,
            attempts: 3,
            last_error: None,
        };
        assert_eq!(
            QueryFailure::from(failure).code,
            ErrorCode::RetriesExhausted
        );
    }

    #[test]
    fn test_search_error_mapping() {
        let failure = QueryFailure::from_search(&RagError::StoreUnavailable("503".into()));
        assert_eq!(failure.code, ErrorCode::StoreUnavailable);

        let failure = QueryFailure::from_search(&RagError::DimensionMismatch {
            expected: 384,
            actual: 768,
        });
        assert_eq!(failure.code, ErrorCode::Configuration);
    }

    #[test]
    fn test_failure_message_hides_diagnostics() {
        let failure = QueryFailure::from_embedding(&RagError::HttpError(
            "connection refused at 10.0.0.3:11434".into(),
        ));
        assert_eq!(failure.code, ErrorCode::EmbeddingUnavailable);
        assert!(!failure.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn test_query_response_shapes() {
        let ok = QueryResponse::from(Ok::<Answer, QueryFailure>(Answer {
            text: "<p>Hi</p>".to_string(),
            sources: Vec::new(),
        }));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"answer": "<p>Hi</p>"})
        );

        let err = QueryResponse::from(Err::<Answer, QueryFailure>(QueryFailure::new(
            ErrorCode::InvalidInput,
        )));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"error": "Please enter a question."})
        );
    }
}
