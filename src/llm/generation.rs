//! Generation client: one request, several attempts
//!
//! Drives [`RetryState`] against a [`CompletionBackend`]. Rate limits and
//! transport failures back off, an oversized payload shrinks the context,
//! everything else fails at once.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::backend::BackendError;
use super::backend::CompletionBackend;
use super::prompts::QaPrompts;
use super::retry::RetryPolicy;
use super::retry::RetryState;
use super::retry::Sleeper;
use super::retry::TokioSleeper;
use crate::rag::Context;

/// Inputs for one generation
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub context: Context,
    pub question: String,
    pub max_output_tokens: u32,
}

/// Successful generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Attempts used, including the successful one
    pub attempts: u32,
    /// Size of the context the answer was generated from
    pub context_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Non-retriable backend error, or a payload that could not shrink
    Fatal,
    /// Every allowed attempt failed with a retriable error
    RetriesExhausted,
    Cancelled,
}

/// Classified generation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("generation failed ({kind:?}) after {attempts} attempt(s)")]
pub struct GenerationFailure {
    pub kind: FailureKind,
    pub retriable: bool,
    pub attempts: u32,
    pub last_error: Option<BackendError>,
}

impl GenerationFailure {
    fn cancelled(attempts: u32, last_error: Option<BackendError>) -> Self {
        Self {
            kind: FailureKind::Cancelled,
            retriable: false,
            attempts,
            last_error,
        }
    }
}

pub type GenerationResult = std::result::Result<Completion, GenerationFailure>;

/// Generation client owning the retry and shrink policy
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn CompletionBackend>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    institution: String,
}

impl GenerationClient {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        policy: RetryPolicy,
        institution: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            policy,
            sleeper: Arc::new(TokioSleeper),
            institution: institution.into(),
        }
    }

    /// Replace the sleeper used for backoff waits
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        self.generate_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Generate an answer, giving up early once `cancel` fires.
    ///
    /// Cancellation is observed before every attempt and during backoff
    /// waits. A call already in flight runs until the backend's own timeout.
    pub async fn generate_with_cancel(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> GenerationResult {
        let GenerationRequest {
            mut context,
            question,
            max_output_tokens,
        } = request;

        let mut state = RetryState::Attempt(1);
        let mut attempts = 0;
        let mut last_error: Option<BackendError> = None;

        loop {
            match state {
                RetryState::Attempt(attempt) => {
                    if cancel.is_cancelled() {
                        info!("Generation cancelled before attempt {}", attempt);
                        return Err(GenerationFailure::cancelled(attempts, last_error));
                    }
                    attempts = attempt;

                    let prompt = QaPrompts::build(&self.institution, &context, &question);
                    debug!(
                        "Generation attempt {}/{} via {} ({} context chars, {} prompt chars)",
                        attempt,
                        self.policy.max_attempts(),
                        self.backend.name(),
                        context.total_chars(),
                        prompt.char_len()
                    );

                    let outcome = match self.backend.complete(&prompt, max_output_tokens).await {
                        Ok(text) if text.trim().is_empty() => Err(BackendError::EmptyCompletion),
                        other => other,
                    };

                    match outcome {
                        Ok(text) => {
                            if attempt > 1 {
                                info!("Generation succeeded on attempt {}", attempt);
                            }
                            return Ok(Completion {
                                text,
                                attempts: attempt,
                                context_chars: context.total_chars(),
                            });
                        }
                        Err(err) => {
                            warn!("Generation attempt {} failed: {}", attempt, err);
                            if let BackendError::RateLimited {
                                retry_after: Some(hint),
                            } = &err
                            {
                                debug!("Backend suggested retrying after {:?}", hint);
                            }
                            state = self.policy.on_failure(attempt, &err);
                            last_error = Some(err);
                        }
                    }
                }
                RetryState::Backoff {
                    next,
                    delay,
                    shrink_context,
                } => {
                    if shrink_context {
                        let before = context.total_chars();
                        match context.shrunk() {
                            Some(smaller) => {
                                info!(
                                    "Payload too large; shrinking context from {} to {} chars (ceiling {} -> {})",
                                    before,
                                    smaller.total_chars(),
                                    context.total_limit(),
                                    smaller.total_limit()
                                );
                                context = smaller;
                            }
                            None => {
                                error!(
                                    "Payload too large and context cannot shrink further ({} chars)",
                                    before
                                );
                                return Err(GenerationFailure {
                                    kind: FailureKind::Fatal,
                                    retriable: false,
                                    attempts,
                                    last_error,
                                });
                            }
                        }
                    }

                    if delay > Duration::ZERO {
                        warn!("Backing off {:?} before attempt {}", delay, next);
                        tokio::select! {
                            () = cancel.cancelled() => {
                                info!("Generation cancelled during backoff");
                                return Err(GenerationFailure::cancelled(attempts, last_error));
                            }
                            () = self.sleeper.sleep(delay) => {}
                        }
                    }
                    state = RetryState::Attempt(next);
                }
                RetryState::Failed { kind, retriable } => {
                    error!(
                        "Generation failed ({:?}) after {} attempt(s): {}",
                        kind,
                        attempts,
                        last_error
                            .as_ref()
                            .map_or_else(|| "unknown".to_string(), ToString::to_string)
                    );
                    return Err(GenerationFailure {
                        kind,
                        retriable,
                        attempts,
                        last_error,
                    });
                }
            }
        }
    }
}
