//! Logging configuration for gikirag

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::errors::RagError;
use crate::Result;

const LOG_FILE_PREFIX: &str = "gikirag.log";

/// Filter directive for a level, applied to this crate and its dependencies
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{level},gikirag={level}"))
}

/// Initialize console and daily-rolling file logging.
///
/// `RUST_LOG` wins over the configured level; `verbose` forces `debug`.
/// Keep the returned guard alive for the life of the process or buffered
/// file output is lost.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<WorkerGuard> {
    let logs_dir = Path::new(&config.directory);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let level = if verbose { "debug" } else { config.level.as_str() };
    let env_filter = if verbose {
        filter_for(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(level))
    };

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(verbose)
        .with_line_number(verbose)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| RagError::Custom(format!("failed to initialize logging: {e}")))?;

    if config.backtrace && std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    tracing::debug!("Logging initialized with level: {}", level);
    tracing::debug!(
        "Log files will be saved to: {}/{}.YYYY-MM-DD",
        logs_dir.display(),
        LOG_FILE_PREFIX
    );

    Ok(guard)
}

/// Initialize simple console logging for tests; repeated calls are no-ops
pub fn init_simple_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(filter_for("debug"))
        .with_test_writer()
        .try_init();
}
