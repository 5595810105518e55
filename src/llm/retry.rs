//! Retry policy and the generation state machine's transitions
//!
//! ```text
//! Attempt(n) --ok--------------------------------> done
//! Attempt(n) --backoff/shrink, n < max---------> Backoff { next: n + 1 } --> Attempt(n + 1)
//! Attempt(n) --fatal, or retriable with n = max--> Failed
//! ```

use std::time::Duration;

use async_trait::async_trait;

use super::backend::BackendError;
use super::backend::Recovery;
use super::generation::FailureKind;
use crate::errors::RagError;
use crate::errors::Result;

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// # Errors
    /// - `max_attempts` of zero
    /// - `max_delay` shorter than `base_delay`
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(RagError::ConfigError(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if max_delay < base_delay {
            return Err(RagError::ConfigError(format!(
                "retry.max_delay_ms ({}) must not be below base_delay_ms ({})",
                max_delay.as_millis(),
                base_delay.as_millis()
            )));
        }
        Ok(Self {
            max_attempts,
            base_delay,
            max_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`, capped
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Next state after attempt `attempt` failed with `error`
    #[must_use]
    pub fn on_failure(&self, attempt: u32, error: &BackendError) -> RetryState {
        let recovery = error.recovery();
        if recovery == Recovery::Fatal {
            return RetryState::Failed {
                kind: FailureKind::Fatal,
                retriable: false,
            };
        }
        if attempt >= self.max_attempts {
            return RetryState::Failed {
                kind: FailureKind::RetriesExhausted,
                retriable: true,
            };
        }

        let next = attempt + 1;
        // `Retry-After` hints never change the delay; waits strictly increase
        match recovery {
            Recovery::Shrink => RetryState::Backoff {
                next,
                delay: Duration::ZERO,
                shrink_context: true,
            },
            _ => RetryState::Backoff {
                next,
                delay: self.backoff_delay(attempt),
                shrink_context: false,
            },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Where the generation loop stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Send attempt `n` (1-based)
    Attempt(u32),
    /// Optionally shrink the context, wait `delay`, then send attempt `next`
    Backoff {
        next: u32,
        delay: Duration,
        shrink_context: bool,
    },
    /// Terminal failure
    Failed { kind: FailureKind, retriable: bool },
}

/// Suspends the current task between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
