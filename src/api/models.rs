//! API request and response models.
//!
//! Requests are parsed from raw bytes rather than through axum's `Json`
//! extractor so that every rejection uses the gateway's own error envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::core::config::GenerationDefaults;
use crate::core::error::{AppError, PROMPT_REQUIRED};
use crate::services::catalog::ModelDescriptor;
use crate::services::provider::{ChatParams, ImageParams};

/// Text generation request (buffered and streaming).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "prompt": "Write a haiku about Rust",
    "model": "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
    "max_tokens": 512,
    "temperature": 0.7
}))]
pub struct GenerationRequest {
    /// User prompt, sent as a single user message
    pub prompt: String,

    /// Model identifier; defaults to the configured chat model
    #[serde(default)]
    pub model: Option<String>,

    /// Maximum tokens to generate (default 512, not range-checked)
    #[serde(default)]
    pub max_tokens: Option<i64>,

    /// Sampling temperature (default 0.7, not range-checked)
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl GenerationRequest {
    pub fn into_params(self, defaults: &GenerationDefaults) -> ChatParams {
        ChatParams {
            model: self.model.unwrap_or_else(|| defaults.chat_model.clone()),
            prompt: self.prompt,
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
        }
    }
}

/// Image generation request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "prompt": "A lighthouse at dusk, oil painting",
    "model": "black-forest-labs/FLUX.1-schnell",
    "steps": 4,
    "n": 1
}))]
pub struct ImageRequest {
    /// Image description
    pub prompt: String,

    /// Model identifier; defaults to the configured image model
    #[serde(default)]
    pub model: Option<String>,

    /// Diffusion steps (default 4)
    #[serde(default)]
    pub steps: Option<i64>,

    /// Number of images to generate (default 1)
    #[serde(default)]
    pub n: Option<i64>,
}

impl ImageRequest {
    pub fn into_params(self, defaults: &GenerationDefaults) -> ImageParams {
        ImageParams {
            model: self.model.unwrap_or_else(|| defaults.image_model.clone()),
            prompt: self.prompt,
            steps: self.steps.unwrap_or(defaults.image_steps),
            n: self.n.unwrap_or(defaults.image_count),
        }
    }
}

/// Parse a request body that must carry a non-empty `prompt`.
///
/// The prompt check runs before typed deserialization so that a missing
/// prompt always yields the same message regardless of other fields.
pub fn parse_prompt_request<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::Validation(PROMPT_REQUIRED.to_string()))?;

    let has_prompt = match value.get("prompt") {
        Some(Value::String(prompt)) => !prompt.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };
    if !has_prompt {
        return Err(AppError::Validation(PROMPT_REQUIRED.to_string()));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}

/// Successful buffered generation. `response` is `null` when the provider
/// returned no text content.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": true,
    "response": "Ownership flows / borrowed lines return home / the checker rests",
    "model": "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo"
}))]
pub struct GenerationResponse {
    pub success: bool,
    pub response: Option<String>,
    pub model: String,
}

/// Successful image generation. `image_url` is `null` when the provider
/// returned no images.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": true,
    "image_url": "https://api.together.ai/imgproxy/abc.png",
    "prompt": "A lighthouse at dusk, oil painting",
    "model": "black-forest-labs/FLUX.1-schnell"
}))]
pub struct ImageResponse {
    pub success: bool,
    pub image_url: Option<String>,
    pub prompt: String,
    pub model: String,
}

/// Liveness payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"status": "healthy", "message": "Backend is running"}))]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: "Backend is running".to_string(),
        }
    }
}

/// Static model catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelList {
    pub models: Vec<ModelDescriptor>,
}
