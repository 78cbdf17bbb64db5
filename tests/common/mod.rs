//! Shared test helpers: a scripted provider double and request builders.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use std::sync::{Arc, Mutex};
use together_gateway::{
    build_router,
    core::{init_metrics, AppConfig, UpstreamError},
    services::{ChatParams, FragmentStream, ImageParams, InferenceProvider},
    AppState,
};
use tower::ServiceExt;

/// What the scripted provider should do on the next call.
#[derive(Clone)]
pub enum Script {
    /// Succeed with this text / these fragments / this URL
    Succeed,
    /// Fail before any output with this HTTP-style status
    FailStatus(u16, String),
    /// Stream the fragments, then fail
    FailMidStream(String),
}

/// Recorded provider calls, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Complete(ChatParams),
    Stream(ChatParams),
    Image(ImageParams),
}

/// Provider double that returns canned output and records every call.
pub struct ScriptedProvider {
    pub completion: Option<String>,
    pub fragments: Vec<String>,
    pub image_url: Option<String>,
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            completion: Some("Hello from the model".to_string()),
            fragments: vec!["Hel".to_string(), "lo".to_string()],
            image_url: Some("https://img.example/1.png".to_string()),
            script: Mutex::new(Script::Succeed),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_completion(mut self, completion: Option<&str>) -> Self {
        self.completion = completion.map(str::to_string);
        self
    }

    pub fn with_fragments(mut self, fragments: &[&str]) -> Self {
        self.fragments = fragments.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_image_url(mut self, url: Option<&str>) -> Self {
        self.image_url = url.map(str::to_string);
        self
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Script {
        self.calls.lock().unwrap().push(call);
        self.script.lock().unwrap().clone()
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete_chat(&self, params: &ChatParams) -> Result<Option<String>, UpstreamError> {
        match self.record(Call::Complete(params.clone())) {
            Script::FailStatus(status, message) => Err(UpstreamError::Status { status, message }),
            _ => Ok(self.completion.clone()),
        }
    }

    async fn stream_chat(&self, params: &ChatParams) -> Result<FragmentStream, UpstreamError> {
        let mut items: Vec<Result<String, UpstreamError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        match self.record(Call::Stream(params.clone())) {
            Script::FailStatus(status, message) => {
                return Err(UpstreamError::Status { status, message })
            }
            Script::FailMidStream(reason) => items.push(Err(UpstreamError::Stream(reason))),
            Script::Succeed => {}
        }
        Ok(Box::pin(futures::stream::iter(items)))
    }

    async fn generate_image(&self, params: &ImageParams) -> Result<Option<String>, UpstreamError> {
        match self.record(Call::Image(params.clone())) {
            Script::FailStatus(status, message) => Err(UpstreamError::Status { status, message }),
            _ => Ok(self.image_url.clone()),
        }
    }
}

/// Build the full router around the given provider with default config.
pub fn app_with(provider: Arc<ScriptedProvider>) -> Router {
    init_metrics();
    let state = Arc::new(AppState::new(AppConfig::default(), provider));
    build_router(state)
}

pub fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
