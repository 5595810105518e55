use clap::Parser;
use gikirag::cli::handle_ask;
use gikirag::cli::handle_check;
use gikirag::cli::handle_config;
use gikirag::cli::handle_serve;
use gikirag::cli::print_error;
use gikirag::cli::Cli;
use gikirag::cli::Commands;
use gikirag::config::AppConfig;
use gikirag::Result;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = gikirag::logging::init_logging(&config.logging, cli.verbose)?;
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Ask {
            question,
            top_k,
            plain,
            html,
        } => {
            handle_ask(
                &config,
                &question,
                top_k,
                Commands::answer_format(plain, html),
            )
            .await
        }
        Commands::Serve { host, port, cors } => handle_serve(&config, host, port, cors).await,
        Commands::Config => {
            handle_config(&config);
            Ok(())
        }
        Commands::Check => handle_check(&config),
    }
}
