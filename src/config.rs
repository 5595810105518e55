use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::embeddings::EmbeddingProvider;
use crate::llm::RetryPolicy;
use crate::rag::AnswerFormat;
use crate::rag::PipelineConfig;
use crate::vector_store::Metric;
use crate::vector_store::DEFAULT_MAX_TOP_K;
use crate::vector_store::StoreProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
    #[serde(default = "default_log_directory")]
    pub directory: String,
}

fn default_log_directory() -> String {
    "logs".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub provider: EmbeddingProvider,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub provider: StoreProvider,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub metric: Metric,
    /// Metadata field holding the passage text
    #[serde(default = "default_text_field")]
    pub text_field: String,
    /// JSON snapshot for the in-memory store
    #[serde(default)]
    pub snapshot_path: Option<String>,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_text_field() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    pub llm_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    "gemma3:27b".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_llm_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
    #[serde(default = "default_max_match_text_chars")]
    pub max_match_text_chars: usize,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_institution")]
    pub institution: String,
    #[serde(default = "default_no_results_message")]
    pub no_results_message: String,
}

fn default_top_k() -> usize {
    5
}

fn default_max_top_k() -> usize {
    DEFAULT_MAX_TOP_K
}

fn default_max_match_text_chars() -> usize {
    800
}

fn default_max_context_chars() -> usize {
    2000
}

fn default_max_output_tokens() -> u32 {
    512
}

fn default_institution() -> String {
    "GIKI".to_string()
}

fn default_no_results_message() -> String {
    "Sorry, I couldn't find any information about that in the knowledge base.".to_string()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            max_match_text_chars: default_max_match_text_chars(),
            max_context_chars: default_max_context_chars(),
            max_output_tokens: default_max_output_tokens(),
            institution: default_institution(),
            no_results_message: default_no_results_message(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub enable_cors: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    90
}

fn default_max_concurrent_queries() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: false,
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrent_queries: default_max_concurrent_queries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector_store: VectorStoreConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::RagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Load from an explicit path when given, otherwise from the default locations
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let pipeline = &self.pipeline;
        if pipeline.max_top_k == 0 {
            return Err(config_error("pipeline.max_top_k must be positive"));
        }
        if pipeline.default_top_k == 0 || pipeline.default_top_k > pipeline.max_top_k {
            return Err(config_error(format!(
                "pipeline.default_top_k must be between 1 and max_top_k ({})",
                pipeline.max_top_k
            )));
        }
        if pipeline.max_match_text_chars == 0 || pipeline.max_context_chars == 0 {
            return Err(config_error("pipeline character limits must be positive"));
        }
        if pipeline.max_match_text_chars > pipeline.max_context_chars {
            return Err(config_error(
                "pipeline.max_match_text_chars must not exceed max_context_chars",
            ));
        }
        if pipeline.max_output_tokens == 0 {
            return Err(config_error("pipeline.max_output_tokens must be positive"));
        }
        if self.embeddings.dimension == 0 {
            return Err(config_error("embeddings.dimension must be positive"));
        }
        if self.server.max_concurrent_queries == 0 {
            return Err(config_error("server.max_concurrent_queries must be positive"));
        }

        self.retry_policy()?;

        if self.embeddings.provider != EmbeddingProvider::Hash {
            check_url("embeddings.endpoint", &self.embeddings.endpoint)?;
        }
        match self.vector_store.provider {
            StoreProvider::Pinecone => check_url("vector_store.endpoint", &self.vector_store.endpoint)?,
            StoreProvider::Memory => {
                if self.vector_store.snapshot_path.is_none() {
                    return Err(config_error(
                        "vector_store.snapshot_path is required for the memory store",
                    ));
                }
            }
        }
        check_url("llm.llm_endpoint", &self.llm.llm_endpoint)?;

        Ok(())
    }

    /// Retry policy for the generation client
    pub fn retry_policy(&self) -> crate::Result<RetryPolicy> {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
        )
    }

    /// Immutable per-pipeline tuning derived from the `[pipeline]` section
    pub fn pipeline_config(&self, format: AnswerFormat) -> PipelineConfig {
        PipelineConfig {
            default_top_k: self.pipeline.default_top_k,
            max_top_k: self.pipeline.max_top_k,
            per_match_limit: self.pipeline.max_match_text_chars,
            total_limit: self.pipeline.max_context_chars,
            max_output_tokens: self.pipeline.max_output_tokens,
            no_results_message: self.pipeline.no_results_message.clone(),
            format,
        }
    }

    /// Copy with credentials masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.embeddings.api_key = config.embeddings.api_key.as_deref().map(redact);
        config.vector_store.api_key = config.vector_store.api_key.as_deref().map(redact);
        config.llm.llm_key = redact(&config.llm.llm_key);
        config
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }

    /// Institution the assistant answers questions about
    pub fn institution(&self) -> &str {
        &self.pipeline.institution
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
                directory: default_log_directory(),
            },
            embeddings: EmbeddingsConfig {
                provider: EmbeddingProvider::Ollama,
                endpoint: default_embedding_endpoint(),
                api_key: None,
                model: "all-minilm".to_string(),
                dimension: 384,
                timeout_secs: default_http_timeout_secs(),
            },
            vector_store: VectorStoreConfig {
                provider: StoreProvider::Pinecone,
                endpoint: "https://your-index.svc.pinecone.io".to_string(),
                api_key: None,
                namespace: None,
                metric: Metric::Cosine,
                text_field: default_text_field(),
                snapshot_path: None,
                timeout_secs: default_http_timeout_secs(),
            },
            llm: LlmConfig {
                llm_endpoint: "http://localhost:11434/v1".to_string(),
                llm_key: "ollama".to_string(),
                llm_model: default_llm_model(),
                temperature: default_temperature(),
                timeout_secs: default_llm_timeout_secs(),
            },
            pipeline: PipelineSettings::default(),
            retry: RetryConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn config_error(message: impl Into<String>) -> crate::RagError {
    crate::RagError::ConfigError(message.into())
}

fn check_url(field: &str, value: &str) -> crate::Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| config_error(format!("{field} is not a valid URL ({value}): {e}")))
}

fn redact(secret: &str) -> String {
    if secret.chars().count() > 8 {
        let prefix: String = secret.chars().take(4).collect();
        format!("{prefix}...[REDACTED]")
    } else {
        "[REDACTED]".to_string()
    }
}
