//! API request handlers

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::types::status_for;
use super::types::HealthResponse;
use super::types::QueryRequest;
use crate::rag::ErrorCode;
use crate::rag::QueryFailure;
use crate::rag::QueryPipeline;
use crate::rag::QueryResponse;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
    /// Deadline for one query, after which it is cancelled
    pub request_timeout: Duration,
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Answer a question (POST /api/query)
///
/// The query runs on its own task. Passing the deadline, or the client going
/// away, cancels it at the next retry boundary.
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> (StatusCode, Json<QueryResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected malformed query body: {}", rejection);
            return failure(QueryFailure::new(ErrorCode::InvalidInput));
        }
    };
    info!("POST /api/query (top_k={:?})", request.top_k);

    let cancel = CancellationToken::new();
    let _disconnect_guard = cancel.clone().drop_guard();

    let task = {
        let pipeline = Arc::clone(&state.pipeline);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            pipeline
                .process_query_with_cancel(&request.question, request.top_k, &cancel)
                .await
        })
    };

    let result = match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            error!("Query task failed: {}", join_error);
            Err(QueryFailure::new(ErrorCode::GenerationFailed))
        }
        Err(_) => {
            warn!(
                "Query exceeded {:?}; cancelling",
                state.request_timeout
            );
            cancel.cancel();
            Err(QueryFailure::new(ErrorCode::Cancelled))
        }
    };

    match result {
        Ok(answer) => (
            StatusCode::OK,
            Json(QueryResponse::Answer {
                answer: answer.text,
            }),
        ),
        Err(err) => failure(err),
    }
}

fn failure(err: QueryFailure) -> (StatusCode, Json<QueryResponse>) {
    (
        status_for(err.code),
        Json(QueryResponse::Error {
            error: err.message().to_string(),
        }),
    )
}
