/// Server setup and initialization
///
/// Wires together the execution engine, the bundled demo graph and the HTTP routes.
/// Provides the main application factory function for creating the Axum app.

use crate::{
    api::{create_graph_routes, create_stream_routes, AppState},
    config::Config,
    runtime::ExecutionEngine,
    tools::register_code_review,
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Create an engine with the demo tools and graph preloaded
pub fn create_engine(config: &Config) -> Arc<ExecutionEngine> {
    tracing::info!("🚀 Initializing execution engine (max_steps = {})", config.engine.max_steps);
    let engine = Arc::new(ExecutionEngine::new(config.engine.clone()));

    tracing::info!("🧰 Registering demo tools and graph");
    register_code_review(&engine);

    engine
}

/// Create the main Axum application around an existing engine
pub fn create_router(engine: Arc<ExecutionEngine>, config: &Config) -> Router {
    let app_state = AppState {
        engine,
        stream: config.stream.clone(),
    };

    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Graph management and execution routes
        .merge(create_graph_routes())
        // Live step streaming
        .merge(create_stream_routes())
        .with_state(app_state)
}

/// Create the main Axum application with all routes
pub fn create_app(config: &Config) -> Router {
    let engine = create_engine(config);
    let app = create_router(engine, config);

    tracing::info!("✅ Application initialized successfully");
    app
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting stepwise server...");

    let app = create_app(&config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
