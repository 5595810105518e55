//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers questions about an institution from its crawled
//! knowledge base:
//! - Context assembly from ranked matches under size limits
//! - The end-to-end query pipeline
//! - Answer formatting for the web layer and the terminal
//!
//! # Examples
//!
//! ```rust,no_run
//! use gikirag::config::AppConfig;
//! use gikirag::rag::AnswerFormat;
//! use gikirag::services::build_pipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let pipeline = build_pipeline(&config, AnswerFormat::Plain)?;
//!
//!     let answer = pipeline
//!         .process_query("What research areas does GIKI focus on?", None)
//!         .await?;
//!     println!("Answer: {}", answer.text);
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod format;
pub mod pipeline;

pub use context::truncate_at_word;
pub use context::Context;
pub use context::ContextAssembler;
pub use context::Fragment;
pub use format::format_answer;
pub use format::AnswerFormat;
pub use pipeline::Answer;
pub use pipeline::ErrorCode;
pub use pipeline::PipelineConfig;
pub use pipeline::QueryFailure;
pub use pipeline::QueryPipeline;
pub use pipeline::QueryResponse;
