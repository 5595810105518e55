//! API request and response types

use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use crate::rag::ErrorCode;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of `POST /api/query`
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// HTTP status for a failed query
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCode::EmbeddingUnavailable | ErrorCode::StoreUnavailable => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ErrorCode::GenerationFailed | ErrorCode::RetriesExhausted => StatusCode::BAD_GATEWAY,
        ErrorCode::Cancelled => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_top_k_optional() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"question":"Where is GIKI?"}"#).unwrap();
        assert_eq!(request.question, "Where is GIKI?");
        assert!(request.top_k.is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorCode::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorCode::StoreUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(ErrorCode::RetriesExhausted),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_for(ErrorCode::Cancelled), StatusCode::GATEWAY_TIMEOUT);
    }
}
