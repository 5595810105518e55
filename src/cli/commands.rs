//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::rag::AnswerFormat;

#[derive(Parser)]
#[command(name = "gikirag")]
#[command(about = "Ask questions about GIKI, answered from its indexed knowledge base")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: level from config)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (default: config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// The question to answer
        question: String,
        /// Number of passages to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Print the answer as plain text (default)
        #[arg(long, conflicts_with = "html")]
        plain: bool,
        /// Print the answer as an HTML fragment
        #[arg(long)]
        html: bool,
    },
    /// Start the HTTP API server
    Serve {
        /// Host to bind (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable permissive CORS
        #[arg(long)]
        cors: bool,
    },
    /// Show current configuration with secrets masked
    Config,
    /// Validate configuration and backend dimensions without answering
    Check,
}

impl Commands {
    /// Output format selected for `ask`
    pub fn answer_format(plain: bool, html: bool) -> AnswerFormat {
        if html && !plain {
            AnswerFormat::Html
        } else {
            AnswerFormat::Plain
        }
    }
}
