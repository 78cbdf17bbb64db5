//! Request and response bodies of the provider's OpenAI-compatible API.

use serde::{Deserialize, Serialize};

use crate::services::provider::{ChatParams, ImageParams};

/// Chat completion request following the OpenAI format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: i64,
    pub temperature: f64,

    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Single user turn carrying the prompt.
    pub fn from_params(params: &ChatParams, stream: bool) -> Self {
        Self {
            model: params.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: Some(params.prompt.clone()),
            }],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream,
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,

    /// `null` for tool-call-only assistant messages
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Message,
}

/// Image generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub steps: i64,
    pub n: i64,
}

impl From<&ImageParams> for ImageGenerationRequest {
    fn from(params: &ImageParams) -> Self {
        Self {
            model: params.model.clone(),
            prompt: params.prompt.clone(),
            steps: params.steps,
            n: params.n,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

/// One generated image. Inline base64 results carry no URL.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}
