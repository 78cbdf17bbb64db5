//! Core functionality for the gateway.
//!
//! This module contains fundamental components used throughout the application:
//! - Configuration management
//! - Error handling
//! - Logging and request context
//! - Metrics collection
//! - HTTP middleware
//! - Stream cancellation
//! - Runtime sizing

pub mod cancel;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod runtime;

// Re-export commonly used types
pub use cancel::{StreamCancelHandle, StreamOutcome};
pub use config::{AppConfig, GenerationDefaults, ServerConfig, UpstreamConfig};
pub use error::{AppError, ErrorEnvelope, Result, UpstreamError, PROMPT_REQUIRED};
pub use logging::{generate_request_id, get_request_id, init_tracing, REQUEST_ID};
pub use metrics::{get_metrics, init_metrics, Metrics};
pub use middleware::{request_id_middleware, MetricsMiddleware};
pub use runtime::worker_threads;
