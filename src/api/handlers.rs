//! HTTP request handlers for the gateway endpoints.

use crate::api::models::{
    parse_prompt_request, GenerationRequest, GenerationResponse, HealthResponse, ImageRequest,
    ImageResponse, ModelList,
};
use crate::api::streaming::relay_fragments;
use crate::api::AppState;
use crate::core::error::ErrorEnvelope;
use crate::core::{get_metrics, get_request_id, AppError, Result, UpstreamError};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;

/// Count an upstream failure and convert it for the client.
///
/// The error itself is logged once, when the response is rendered.
fn upstream_failure(operation: &str, error: UpstreamError) -> AppError {
    get_metrics()
        .upstream_errors
        .with_label_values(&[operation])
        .inc();
    tracing::debug!(
        request_id = %get_request_id(),
        operation = operation,
        error = %error,
        "Upstream call failed"
    );
    AppError::Upstream(error)
}

/// Models outside the catalog are still forwarded; the catalog only suggests.
fn note_uncatalogued(state: &AppState, model: &str) {
    if !state.catalog.contains(model) {
        tracing::debug!(model = %model, "Model not in catalog; forwarding as-is");
    }
}

/// Liveness check. Never contacts the provider.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Buffered text generation.
///
/// Sends the prompt as a single user message and returns the first choice's
/// text once the provider has finished.
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "generation",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "Generated text", body = GenerationResponse),
        (status = 400, description = "Missing or invalid prompt", body = ErrorEnvelope),
        (status = 500, description = "Upstream failure", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, body), fields(request_id = %get_request_id()))]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<GenerationResponse>> {
    let request: GenerationRequest = parse_prompt_request(&body)?;
    let params = request.into_params(&state.config.defaults);
    note_uncatalogued(&state, &params.model);

    tracing::debug!(
        model = %params.model,
        max_tokens = params.max_tokens,
        temperature = params.temperature,
        "Generating completion"
    );

    let start = Instant::now();
    let response = state
        .provider
        .complete_chat(&params)
        .await
        .map_err(|e| upstream_failure("chat", e))?;

    tracing::info!(
        model = %params.model,
        provider = state.provider.name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Completion finished"
    );
    if response.is_none() {
        tracing::warn!(model = %params.model, "Provider returned no text content");
    }

    Ok(Json(GenerationResponse {
        success: true,
        response,
        model: params.model,
    }))
}

/// Streaming text generation.
///
/// The response body is the raw concatenation of text fragments as the
/// provider produces them, with no framing.
#[utoipa::path(
    post,
    path = "/api/stream-generate",
    tag = "generation",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "Incremental plain text", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing or invalid prompt", body = ErrorEnvelope),
        (status = 500, description = "Upstream failure before the first byte", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, body), fields(request_id = %get_request_id()))]
pub async fn stream_generate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response> {
    let request: GenerationRequest = parse_prompt_request(&body)?;
    let params = request.into_params(&state.config.defaults);
    note_uncatalogued(&state, &params.model);

    tracing::debug!(model = %params.model, "Opening completion stream");

    // Errors here happen before any byte is written, so they still get the
    // JSON envelope. Anything later aborts the body instead.
    let fragments = state
        .provider
        .stream_chat(&params)
        .await
        .map_err(|e| upstream_failure("stream", e))?;

    let model_label = state.catalog.metric_label(&params.model).to_string();
    Ok(relay_fragments(fragments, model_label))
}

/// Image generation. Returns the URL of the first generated image.
#[utoipa::path(
    post,
    path = "/api/generate-image",
    tag = "generation",
    request_body = ImageRequest,
    responses(
        (status = 200, description = "Generated image URL (null if none returned)", body = ImageResponse),
        (status = 400, description = "Missing or invalid prompt", body = ErrorEnvelope),
        (status = 500, description = "Upstream failure", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, body), fields(request_id = %get_request_id()))]
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ImageResponse>> {
    let request: ImageRequest = parse_prompt_request(&body)?;
    let params = request.into_params(&state.config.defaults);

    let image_url = state
        .provider
        .generate_image(&params)
        .await
        .map_err(|e| upstream_failure("image", e))?;

    if image_url.is_none() {
        tracing::warn!(model = %params.model, "Provider returned no images");
    }

    Ok(Json(ImageResponse {
        success: true,
        image_url,
        prompt: params.prompt,
        model: params.model,
    }))
}

/// List the configured model catalog.
#[utoipa::path(
    get,
    path = "/api/models",
    tag = "models",
    responses(
        (status = 200, description = "Available models", body = ModelList)
    )
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelList> {
    Json(ModelList {
        models: state.catalog.models().to_vec(),
    })
}

/// Prometheus metrics endpoint.
#[tracing::instrument]
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response())
}
