//! Prometheus metrics for monitoring the gateway.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter, register_int_counter_vec,
    GaugeVec, HistogramVec, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of requests by method, endpoint, and status
    pub request_count: IntCounterVec,

    /// Request duration histogram in seconds
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Upstream failures by operation (chat, stream, image)
    pub upstream_errors: IntCounterVec,

    /// Text fragments relayed to clients by model
    pub stream_fragments: IntCounterVec,

    /// Streams dropped by the client before the upstream finished
    pub stream_disconnects: IntCounter,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// This should be called once at application startup. Subsequent calls
/// return the same instance.
///
/// # Examples
///
/// ```no_run
/// use together_gateway::core::metrics::init_metrics;
///
/// let metrics = init_metrics();
/// metrics.request_count.with_label_values(&["GET", "/health", "200"]).inc();
/// ```
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "gateway_requests_total",
            "Total number of requests",
            &["method", "endpoint", "status_code"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "gateway_request_duration_seconds",
            "Request duration in seconds",
            &["method", "endpoint"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "gateway_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let upstream_errors = register_int_counter_vec!(
            "gateway_upstream_errors_total",
            "Total number of failed calls to the inference provider",
            &["operation"]
        )
        .expect("Failed to register upstream_errors metric");

        let stream_fragments = register_int_counter_vec!(
            "gateway_stream_fragments_total",
            "Total number of streamed text fragments relayed to clients",
            &["model"]
        )
        .expect("Failed to register stream_fragments metric");

        let stream_disconnects = register_int_counter!(
            "gateway_stream_disconnects_total",
            "Streams abandoned by the client before completion"
        )
        .expect("Failed to register stream_disconnects metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            upstream_errors,
            stream_fragments,
            stream_disconnects,
        }
    })
}

/// Get the global metrics instance, initializing it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}
