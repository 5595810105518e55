//! Answer generation against a language model
//!
//! [`GenerationClient`] wraps a [`CompletionBackend`] with bounded retries,
//! exponential backoff and context shrinking on oversized payloads.

pub mod backend;
pub mod client;
pub mod generation;
pub mod prompts;
pub mod retry;

pub use backend::BackendError;
pub use backend::CompletionBackend;
pub use backend::Recovery;
pub use client::ChatCompletionsBackend;
pub use generation::Completion;
pub use generation::FailureKind;
pub use generation::GenerationClient;
pub use generation::GenerationFailure;
pub use generation::GenerationRequest;
pub use generation::GenerationResult;
pub use prompts::Prompt;
pub use prompts::PromptTemplate;
pub use prompts::QaPrompts;
pub use retry::RetryPolicy;
pub use retry::RetryState;
pub use retry::Sleeper;
pub use retry::TokioSleeper;
