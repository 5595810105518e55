//! HTTP server implementation

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::AppState;
use super::routes;
use crate::config::AppConfig;
use crate::rag::QueryPipeline;
use crate::Result;

/// Options for [`build_router`] and [`serve_api`]
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub request_timeout: Duration,
    pub max_concurrent_queries: usize,
}

impl ServeOptions {
    /// Options from the `[server]` section
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            enable_cors: config.server.enable_cors,
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
            max_concurrent_queries: config.server.max_concurrent_queries,
        }
    }
}

/// Assemble the application router with its middleware stack
pub fn build_router(pipeline: Arc<QueryPipeline>, options: &ServeOptions) -> Router {
    let state = AppState {
        pipeline,
        request_timeout: options.request_timeout,
    };

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(GlobalConcurrencyLimitLayer::new(
            options.max_concurrent_queries.max(1),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Add CORS if enabled
    if options.enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server and run until Ctrl-C
pub async fn serve_api(pipeline: Arc<QueryPipeline>, options: ServeOptions) -> Result<()> {
    info!("🚀 Starting gikirag API server...");

    let app = build_router(pipeline, &options);

    let addr = format!("{}:{}", options.host, options.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /api/health - Health check");
    info!("  POST /api/query  - Ask a question");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
