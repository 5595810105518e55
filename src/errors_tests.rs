//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::RagError;

    // ====== Error Type Tests ======

    #[test]
    fn test_custom_error() {
        let error = RagError::Custom("Test error message".to_string());
        assert_eq!(format!("{error}"), "Test error message");
    }

    #[test]
    fn test_config_error() {
        let error = RagError::ConfigError("max_top_k must be positive".to_string());
        assert!(matches!(error, RagError::ConfigError(_)));
        assert!(format!("{error}").contains("configuration"));
        assert!(error.is_configuration());
    }

    #[test]
    fn test_dimension_mismatch_is_configuration() {
        let error = RagError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert!(error.is_configuration());
        assert_eq!(
            error.to_string(),
            "Embedding dimension mismatch: expected 384, got 768"
        );
    }

    #[test]
    fn test_store_unavailable_is_not_configuration() {
        let error = RagError::StoreUnavailable("connection refused".to_string());
        assert!(!error.is_configuration());
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_invalid_input_display() {
        let error = RagError::InvalidInput("question must not be empty".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid input: question must not be empty"
        );
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let rag_err: RagError = io_err.into();

        assert!(matches!(rag_err, RagError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let parse_result: Result<serde_json::Value, _> = serde_json::from_str("{invalid json}");

        if let Err(json_err) = parse_result {
            let rag_err: RagError = json_err.into();
            assert!(matches!(rag_err, RagError::JsonError(_)));
        }
    }

    #[test]
    fn test_error_from_toml() {
        let parse_result: Result<toml::Value, _> = toml::from_str("not = [valid");
        let rag_err: RagError = parse_result.unwrap_err().into();
        assert!(matches!(rag_err, RagError::TomlParsing(_)));
        assert!(rag_err.is_configuration());
    }

    // ====== Error Debug/Display Tests ======

    #[test]
    fn test_error_debug_format() {
        let error = RagError::Custom("Debug test".to_string());
        assert!(format!("{error:?}").contains("Custom"));
    }
}
