//! HTTP middleware for request IDs and metrics.

use crate::core::logging::{generate_request_id, REQUEST_ID};
use crate::core::metrics::get_metrics;
use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Header carrying the request ID in both directions.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest client-supplied request ID we are willing to echo back.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Assign a request ID (reusing a sane client-supplied one), run the rest of
/// the stack inside its task-local scope, and echo it on the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let mut response = REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}

/// Metrics middleware for tracking request statistics.
pub struct MetricsMiddleware;

impl MetricsMiddleware {
    /// Middleware function to track request metrics.
    ///
    /// Records request count, duration, and active requests. For streaming
    /// responses the duration covers time to headers, not the full body.
    ///
    /// Series are labelled by the route template, so requests that matched
    /// no route are not recorded.
    pub async fn track_metrics(request: Request, next: Next) -> Response {
        let Some(endpoint) = request
            .extensions()
            .get::<MatchedPath>()
            .map(|path| path.as_str().to_string())
        else {
            return next.run(request).await;
        };
        let method = request.method().to_string();

        // Skip metrics endpoint itself to avoid recursion
        if endpoint == "/metrics" {
            return next.run(request).await;
        }

        let metrics = get_metrics();

        metrics
            .active_requests
            .with_label_values(&[&endpoint])
            .inc();

        let start = Instant::now();
        let response = next.run(request).await;
        let duration = start.elapsed().as_secs_f64();
        let status_code = response.status().as_u16().to_string();

        metrics
            .request_count
            .with_label_values(&[&method, &endpoint, &status_code])
            .inc();

        metrics
            .request_duration
            .with_label_values(&[&method, &endpoint])
            .observe(duration);

        metrics
            .active_requests
            .with_label_values(&[&endpoint])
            .dec();

        response
    }
}
