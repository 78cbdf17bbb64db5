//! The seam between the HTTP layer and the remote inference capability.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::core::error::UpstreamError;

/// Fully-defaulted parameters for a single-turn chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatParams {
    pub model: String,
    pub prompt: String,
    pub max_tokens: i64,
    pub temperature: f64,
}

/// Fully-defaulted parameters for image generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub model: String,
    pub prompt: String,
    pub steps: i64,
    pub n: i64,
}

/// Lazy, finite, non-restartable sequence of text fragments in upstream order.
pub type FragmentStream = BoxStream<'static, Result<String, UpstreamError>>;

/// Remote inference capability.
///
/// Implementations must be cheap to share across requests; the gateway holds a
/// single instance behind an `Arc` for the life of the process.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run a chat completion to the end and return the first choice's text,
    /// or `None` when the provider sent `content: null`.
    async fn complete_chat(&self, params: &ChatParams) -> Result<Option<String>, UpstreamError>;

    /// Start a streaming chat completion.
    ///
    /// Errors that occur before the first byte of the stream (transport,
    /// non-success status) are returned here; later failures arrive as `Err`
    /// items on the stream.
    async fn stream_chat(&self, params: &ChatParams) -> Result<FragmentStream, UpstreamError>;

    /// Generate images and return the first result's URL, if any.
    async fn generate_image(&self, params: &ImageParams) -> Result<Option<String>, UpstreamError>;
}
