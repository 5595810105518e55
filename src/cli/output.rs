//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the gikirag CLI

use crate::rag::Answer;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// Returns the string with a "..." suffix if it was truncated.
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print an answer followed by its sources
pub fn print_answer(answer: &Answer) {
    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!();
        println!("📚 Sources:");
        for (idx, source) in answer.sources.iter().enumerate() {
            println!("  {}. {}", idx + 1, truncate_str(source, 100));
        }
    }
}

/// Print configuration; pass a redacted copy
pub fn print_config(config: &AppConfig) {
    println!("📋 gikirag Configuration:");
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!("  Directory: {}", config.logging.directory);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {:?}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embeddings.model);
    println!("  Dimension: {}", config.embedding_dimension());
    if let Some(key) = &config.embeddings.api_key {
        println!("  Key: {key}");
    }
    println!();

    println!("🗂️  Vector store:");
    println!("  Provider: {:?}", config.vector_store.provider);
    println!("  Metric: {:?}", config.vector_store.metric);
    if let Some(path) = &config.vector_store.snapshot_path {
        println!("  Snapshot: {path}");
    } else {
        println!("  Endpoint: {}", config.vector_store.endpoint);
    }
    if let Some(namespace) = &config.vector_store.namespace {
        println!("  Namespace: {namespace}");
    }
    if let Some(key) = &config.vector_store.api_key {
        println!("  Key: {key}");
    }
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Model: {}", config.llm_model());
    println!("  Key: {}", config.llm.llm_key);
    println!("  Temperature: {}", config.llm.temperature);
    println!();

    println!("⚙️  Pipeline:");
    println!("  Institution: {}", config.institution());
    println!(
        "  top_k: {} (max {})",
        config.pipeline.default_top_k, config.pipeline.max_top_k
    );
    println!(
        "  Context: {} chars per match, {} total",
        config.pipeline.max_match_text_chars, config.pipeline.max_context_chars
    );
    println!("  Max output tokens: {}", config.pipeline.max_output_tokens);
    println!();

    println!("🔄 Retry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!(
        "  Backoff: {}ms doubling, capped at {}ms",
        config.retry.base_delay_ms, config.retry.max_delay_ms
    );
    println!();

    println!("🌐 Server:");
    println!("  Bind: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.enable_cors);
    println!("  Request timeout: {}s", config.server.request_timeout_secs);
    println!(
        "  Max concurrent queries: {}",
        config.server.max_concurrent_queries
    );
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
