//! Together Gateway - a thin HTTP front for the Together AI inference API
//!
//! The gateway exposes a small JSON surface for browser and script clients:
//!
//! - **Buffered generation**: prompt in, full completion text out
//! - **Streaming generation**: completion text relayed fragment by fragment
//!   as a plain-text chunked body
//! - **Image generation**: prompt in, URL of the first generated image out
//! - **Model catalog**: a static, configurable list of suggested models
//! - **Metrics & Monitoring**: Prometheus metrics and structured logs
//!
//! # Architecture
//!
//! The codebase is organized into three layers:
//!
//! - [`core`]: Core functionality (config, errors, logging, metrics, middleware)
//! - [`api`]: HTTP handlers, request/response models, streaming relay, router
//! - [`services`]: The inference provider seam and its Together AI client
//!
//! # Configuration
//!
//! Optional environment variables:
//! - `TOGETHER_API_KEY`: Provider credential; generation fails without it
//! - `TOGETHER_API_BASE`: Provider base URL (default: https://api.together.xyz/v1)
//! - `HOST`: Server bind address (default: 0.0.0.0)
//! - `PORT`: Server port (default: 5000)
//! - `VERIFY_SSL`: Verify SSL certificates for upstream (default: true)
//! - `REQUEST_TIMEOUT_SECS`: Upstream request timeout in seconds (default: none)
//! - `GATEWAY_CONFIG`: Path to a YAML/TOML/JSON config file

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use api::{build_router, AppState, GatewayApiDoc, GenerationRequest, GenerationResponse};
pub use core::{AppConfig, AppError, Result, UpstreamError};
pub use services::{InferenceProvider, TogetherClient};
