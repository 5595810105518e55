use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl RagError {
    /// Configuration-level faults cannot be fixed by retrying the query
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_) | Self::DimensionMismatch { .. } | Self::TomlParsing(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
