//! Together Gateway - Main entry point
//!
//! This binary creates and runs the HTTP server with all configured routes and middleware.

use anyhow::Result;
use std::sync::Arc;
use together_gateway::{
    build_router,
    core::{init_metrics, init_tracing, worker_threads, AppConfig},
    AppState, TogetherClient,
};

fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    let worker_threads = worker_threads();
    println!("Tokio runtime: using {} worker threads", worker_threads);

    // Build custom Tokio runtime with explicit thread count
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    init_tracing();
    init_metrics();

    let config = AppConfig::from_env()?;

    if !config.upstream.has_api_key() {
        tracing::warn!("TOGETHER_API_KEY not found in environment variables");
        tracing::warn!("Please set it in your .env file");
    }

    let client = TogetherClient::new(&config.upstream)?;
    tracing::info!(
        api_base = %client.api_base(),
        timeout_secs = ?config.upstream.request_timeout_secs,
        verify_ssl = config.upstream.verify_ssl,
        "Together AI client ready"
    );

    let host = config.server.host.clone();
    let port = config.server.port;
    let state = Arc::new(AppState::new(config, Arc::new(client)));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!("Starting Together Gateway on {}", listener.local_addr()?);
    tracing::info!("Generation API: /api/generate, /api/stream-generate, /api/generate-image");
    tracing::info!("Catalog: /api/models");
    tracing::info!("Swagger UI: /swagger-ui");
    tracing::info!("Metrics endpoint: /metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
