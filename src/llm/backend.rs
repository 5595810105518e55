//! Completion backend capability and its error signals

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use super::prompts::Prompt;

/// Longest backend error body kept in diagnostics
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Failure signal reported by a completion backend for one attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("rate limited by completion backend")]
    RateLimited { retry_after: Option<Duration> },

    #[error("request payload too large")]
    PayloadTooLarge,

    #[error("completion request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("request rejected: {0}")]
    Configuration(String),

    #[error("unexpected backend response: {0}")]
    Unclassified(String),

    #[error("backend returned an empty completion")]
    EmptyCompletion,
}

/// How the retry loop should react to a [`BackendError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Wait, then resend the same request
    Backoff,
    /// Shrink the context, then resend immediately
    Shrink,
    /// Give up
    Fatal,
}

impl BackendError {
    /// Map a non-success HTTP status onto a backend signal
    pub fn from_status(status: StatusCode, body: &str, retry_after: Option<Duration>) -> Self {
        let body = clip(body);
        match status.as_u16() {
            429 => Self::RateLimited { retry_after },
            413 => Self::PayloadTooLarge,
            408 | 504 => Self::Timeout,
            401 | 403 => Self::Authentication(format!("{status}: {body}")),
            400 | 404 | 422 => Self::Configuration(format!("{status}: {body}")),
            _ => Self::Unclassified(format!("{status}: {body}")),
        }
    }

    #[must_use]
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::RateLimited { .. } | Self::Timeout | Self::Network(_) => Recovery::Backoff,
            Self::PayloadTooLarge => Recovery::Shrink,
            Self::Authentication(_)
            | Self::Configuration(_)
            | Self::Unclassified(_)
            | Self::EmptyCompletion => Recovery::Fatal,
        }
    }

    pub fn is_retriable(&self) -> bool {
        self.recovery() != Recovery::Fatal
    }
}

fn clip(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let clipped: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{clipped}...")
    }
}

/// Capability: produce a completion for a prompt.
///
/// One call is one attempt; retrying is the caller's job.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    async fn complete(
        &self,
        prompt: &Prompt,
        max_output_tokens: u32,
    ) -> std::result::Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let wait = Some(Duration::from_secs(7));
        assert_eq!(
            BackendError::from_status(StatusCode::TOO_MANY_REQUESTS, "", wait),
            BackendError::RateLimited { retry_after: wait }
        );
        assert_eq!(
            BackendError::from_status(StatusCode::PAYLOAD_TOO_LARGE, "", None),
            BackendError::PayloadTooLarge
        );
        assert_eq!(
            BackendError::from_status(StatusCode::GATEWAY_TIMEOUT, "", None),
            BackendError::Timeout
        );
        assert_eq!(
            BackendError::from_status(StatusCode::REQUEST_TIMEOUT, "", None),
            BackendError::Timeout
        );
        assert!(matches!(
            BackendError::from_status(StatusCode::UNAUTHORIZED, "bad key", None),
            BackendError::Authentication(_)
        ));
        assert!(matches!(
            BackendError::from_status(StatusCode::FORBIDDEN, "", None),
            BackendError::Authentication(_)
        ));
        assert!(matches!(
            BackendError::from_status(StatusCode::NOT_FOUND, "no such model", None),
            BackendError::Configuration(_)
        ));
        assert!(matches!(
            BackendError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom", None),
            BackendError::Unclassified(_)
        ));
    }

    #[test]
    fn test_recovery_classes() {
        assert_eq!(
            BackendError::RateLimited { retry_after: None }.recovery(),
            Recovery::Backoff
        );
        assert_eq!(BackendError::Timeout.recovery(), Recovery::Backoff);
        assert_eq!(
            BackendError::Network("reset".into()).recovery(),
            Recovery::Backoff
        );
        assert_eq!(BackendError::PayloadTooLarge.recovery(), Recovery::Shrink);
        assert_eq!(
            BackendError::Authentication("401".into()).recovery(),
            Recovery::Fatal
        );
        assert!(!BackendError::EmptyCompletion.is_retriable());
        assert!(!BackendError::Unclassified("502".into()).is_retriable());
    }

    #[test]
    fn test_long_bodies_are_clipped() {
        let body = "x".repeat(1_000);
        let BackendError::Unclassified(message) =
            BackendError::from_status(StatusCode::BAD_GATEWAY, &body, None)
        else {
            panic!("expected unclassified error");
        };
        assert!(message.len() < 300);
        assert!(message.ends_with("..."));
    }
}
