//! One-shot question handler

use crate::cli::output::print_answer;
use crate::errors::RagError;
use crate::rag::AnswerFormat;
use crate::services::build_pipeline;
use crate::AppConfig;
use crate::Result;

pub async fn handle_ask(
    config: &AppConfig,
    question: &str,
    top_k: Option<usize>,
    format: AnswerFormat,
) -> Result<()> {
    let pipeline = build_pipeline(config, format)?;

    match pipeline.process_query(question, top_k).await {
        Ok(answer) => {
            print_answer(&answer);
            Ok(())
        }
        Err(failure) => Err(RagError::Custom(failure.message().to_string())),
    }
}
