//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - ask: One-shot questions
//! - serve: API server
//! - info: Configuration display and checks

pub mod ask;
pub mod info;
pub mod serve;

// Re-export all public handlers
pub use ask::*;
pub use info::*;
pub use serve::*;
