//! HTTP client for the Together AI inference API.
//!
//! Together exposes OpenAI-compatible endpoints, so the client only needs to
//! know about `/chat/completions` (buffered and SSE) and `/images/generations`.

use std::error::Error as _;
use std::time::{Duration, Instant};

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Serialize;

use crate::core::config::UpstreamConfig;
use crate::core::error::UpstreamError;
use crate::services::provider::{ChatParams, FragmentStream, ImageParams, InferenceProvider};
use crate::services::sse::{fragment_from_chunk, SseDecoder, SseEvent};
use crate::services::wire::{
    ChatCompletionRequest, ChatCompletionResponse, ErrorResponse, ImageGenerationRequest,
    ImageGenerationResponse,
};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const IMAGE_GENERATIONS_PATH: &str = "/images/generations";

/// Longest upstream error body echoed back verbatim.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Together AI client. Cheap to clone; the connection pool is shared.
#[derive(Clone)]
pub struct TogetherClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl TogetherClient {
    /// Build a client with connection pooling from the upstream settings.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .pool_max_idle_per_host(100)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60));

        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self::with_http_client(builder.build()?, config))
    }

    /// Reuse an existing reqwest client.
    pub fn with_http_client(http: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential)
    }

    /// POST a JSON body and return the response if the status is a success.
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, UpstreamError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.api_base, path);
        let start = Instant::now();

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    url = %url,
                    error = %e,
                    error_source = ?e.source(),
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    "HTTP request failed to provider"
                );
                UpstreamError::from(e)
            })?;

        tracing::debug!(
            url = %url,
            status = %response.status(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "HTTP request completed"
        );

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response).await)
        }
    }
}

/// Turn a non-success response into [`UpstreamError::Status`], preferring the
/// provider's own `error.message`.
async fn status_error(response: reqwest::Response) -> UpstreamError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        Err(_) => body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    };

    tracing::warn!(status = status.as_u16(), message = %message, "Provider returned error status");

    UpstreamError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Decode an SSE byte stream into text fragments, stopping at `[DONE]`.
///
/// A chunk that fails to parse, an `error` object in the stream, or a broken
/// connection ends the stream with an `Err` item. Nothing is skipped, so the
/// fragments seen before an error are always a prefix of the real output.
pub fn decode_fragments<S, E>(
    body: S,
) -> impl Stream<Item = Result<String, UpstreamError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let mut body = Box::pin(body);

    try_stream! {
        let mut decoder = SseDecoder::new();
        let mut done = false;

        while !done {
            let events = match body.next().await {
                Some(chunk) => {
                    let chunk = chunk.map_err(|e| UpstreamError::Stream(e.to_string()))?;
                    decoder.push(&chunk)
                }
                None => {
                    done = true;
                    decoder.finish().into_iter().collect()
                }
            };

            for event in events {
                match event {
                    SseEvent::Done => {
                        done = true;
                        break;
                    }
                    SseEvent::Data(data) => match fragment_from_chunk(&data) {
                        Ok(Some(fragment)) => {
                            yield fragment;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "Ending stream on bad chunk");
                            Err::<(), UpstreamError>(e)?;
                        }
                    },
                }
            }
        }
    }
}

#[async_trait]
impl InferenceProvider for TogetherClient {
    fn name(&self) -> &str {
        "together"
    }

    async fn complete_chat(&self, params: &ChatParams) -> Result<Option<String>, UpstreamError> {
        let request = ChatCompletionRequest::from_params(params, false);
        let response = self.post(CHAT_COMPLETIONS_PATH, &request).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Decode("response contained no choices".to_string()))?;

        Ok(choice.message.content)
    }

    async fn stream_chat(&self, params: &ChatParams) -> Result<FragmentStream, UpstreamError> {
        let request = ChatCompletionRequest::from_params(params, true);
        let response = self.post(CHAT_COMPLETIONS_PATH, &request).await?;
        Ok(Box::pin(decode_fragments(response.bytes_stream())))
    }

    async fn generate_image(&self, params: &ImageParams) -> Result<Option<String>, UpstreamError> {
        let request = ImageGenerationRequest::from(params);
        let response = self.post(IMAGE_GENERATIONS_PATH, &request).await?;

        let generated: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        Ok(generated.data.into_iter().next().and_then(|image| image.url))
    }
}
