//! API layer for the gateway.
//!
//! This module contains the HTTP handlers, request/response models, the
//! plain-text streaming relay and the router that ties them together.

pub mod disconnect;
pub mod handlers;
pub mod models;
pub mod streaming;

use crate::core::error::ErrorEnvelope;
use crate::core::{request_id_middleware, AppConfig, MetricsMiddleware};
use crate::services::{InferenceProvider, ModelCatalog, ModelDescriptor};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Re-export commonly used types
pub use handlers::{generate, generate_image, health, list_models, metrics_handler, stream_generate};
pub use models::{
    GenerationRequest, GenerationResponse, HealthResponse, ImageRequest, ImageResponse, ModelList,
};
pub use streaming::relay_fragments;

/// Application state shared across handlers.
///
/// Built once at startup and never mutated. The provider sits behind a trait
/// object so tests can swap in a double.
pub struct AppState {
    pub config: AppConfig,
    pub catalog: ModelCatalog,
    pub provider: Arc<dyn InferenceProvider>,
}

impl AppState {
    pub fn new(config: AppConfig, provider: Arc<dyn InferenceProvider>) -> Self {
        let catalog = ModelCatalog::new(config.catalog.clone());
        Self {
            config,
            catalog,
            provider,
        }
    }
}

/// OpenAPI documentation for the public endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::generate,
        handlers::stream_generate,
        handlers::generate_image,
        handlers::list_models,
    ),
    components(
        schemas(
            GenerationRequest,
            GenerationResponse,
            ImageRequest,
            ImageResponse,
            HealthResponse,
            ModelList,
            ModelDescriptor,
            ErrorEnvelope,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "generation", description = "Text and image generation"),
        (name = "models", description = "Model catalog")
    ),
    info(
        title = "Together Gateway API",
        description = "Thin HTTP gateway in front of the Together AI inference API"
    )
)]
pub struct GatewayApiDoc;

/// Build the full router: API routes, docs, metrics and the outer layers.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .route("/api/stream-generate", post(stream_generate))
        .route("/api/generate-image", post(generate_image))
        .route("/api/models", get(list_models))
        .layer(axum::middleware::from_fn(MetricsMiddleware::track_metrics))
        .with_state(state);

    let swagger_ui =
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", GatewayApiDoc::openapi());

    Router::new()
        .merge(swagger_ui)
        .merge(api_routes)
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
