//! API server handler

use std::sync::Arc;

use crate::api::serve_api;
use crate::api::ServeOptions;
use crate::rag::AnswerFormat;
use crate::services::build_pipeline;
use crate::AppConfig;
use crate::Result;

pub async fn handle_serve(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    let mut options = ServeOptions::from_config(config);
    if let Some(host) = host {
        options.host = host;
    }
    if let Some(port) = port {
        options.port = port;
    }
    options.enable_cors |= cors;

    println!("🚀 Starting gikirag API Server");
    println!("==============================\n");
    println!("📍 Host: {}", options.host);
    println!("🔌 Port: {}", options.port);
    println!(
        "🌐 CORS: {}",
        if options.enable_cors {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    println!();

    let pipeline = Arc::new(build_pipeline(config, AnswerFormat::Html)?);
    serve_api(pipeline, options).await
}
