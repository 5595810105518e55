//! Information display handlers (config, check)

use crate::cli::output::print_config;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::services::check_dimensions;
use crate::services::create_embedder;
use crate::services::create_generator;
use crate::services::create_store;
use crate::AppConfig;
use crate::Result;

pub fn handle_config(config: &AppConfig) {
    print_config(&config.redacted());
}

/// Build every backend and verify they agree, without sending a query
pub fn handle_check(config: &AppConfig) -> Result<()> {
    print_info("Checking configuration...");
    print_success("Configuration file is valid");

    let embedder = create_embedder(config)?;
    let store = create_store(config)?;
    check_dimensions(embedder.as_ref(), store.as_ref())?;
    print_success(&format!(
        "Embedder '{}' and store '{}' agree on {} dimensions",
        embedder.name(),
        store.name(),
        store.dimension()
    ));

    let generator = create_generator(config)?;
    print_success(&format!(
        "Generation backend '{}' ready (up to {} attempts)",
        generator.backend_name(),
        generator.policy().max_attempts()
    ));

    Ok(())
}
