//! Configuration management for the gateway.
//!
//! Configuration is layered: built-in defaults, then an optional file named by
//! `GATEWAY_CONFIG` (format inferred from its extension), then a handful of
//! environment variable overrides. The result is immutable for the lifetime
//! of the process.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::services::catalog::ModelDescriptor;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote inference provider settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Values used when a request omits an optional field
    #[serde(default)]
    pub defaults: GenerationDefaults,

    /// Static model catalog served by `/api/models`
    #[serde(default = "default_catalog")]
    pub catalog: Vec<ModelDescriptor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            defaults: GenerationDefaults::default(),
            catalog: default_catalog(),
        }
    }
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Connection settings for the hosted inference API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL, without trailing slash
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Static bearer credential. Absence is allowed; calls fail at request time.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Whole-request timeout. `None` waits indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Whether to verify the provider's TLS certificate
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            request_timeout_secs: None,
            verify_ssl: default_verify_ssl(),
        }
    }
}

impl UpstreamConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Fallback values for optional request fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationDefaults {
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_image_steps")]
    pub image_steps: i64,

    #[serde(default = "default_image_count")]
    pub image_count: i64,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            chat_model: default_chat_model(),
            image_model: default_image_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            image_steps: default_image_steps(),
            image_count: default_image_count(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_api_base() -> String {
    "https://api.together.xyz/v1".to_string()
}

fn default_verify_ssl() -> bool {
    true
}

fn default_chat_model() -> String {
    "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo".to_string()
}

fn default_image_model() -> String {
    "black-forest-labs/FLUX.1-schnell".to_string()
}

fn default_max_tokens() -> i64 {
    512
}

fn default_temperature() -> f64 {
    0.7
}

fn default_image_steps() -> i64 {
    4
}

fn default_image_count() -> i64 {
    1
}

fn default_catalog() -> Vec<ModelDescriptor> {
    crate::services::catalog::default_descriptors()
}

impl AppConfig {
    /// Load configuration from the optional file named by `GATEWAY_CONFIG`,
    /// then apply environment overrides.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var("GATEWAY_CONFIG").ok();
        Self::load(path.as_deref())
    }

    /// Load configuration from `path` (if given) and apply environment
    /// overrides. A missing file is an error; a missing path is not.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use together_gateway::core::config::AppConfig;
    ///
    /// let config = AppConfig::load(Some("gateway.yaml")).expect("Failed to load config");
    /// ```
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => ::config::Config::builder()
                .add_source(::config::File::with_name(path).required(true))
                .build()
                .with_context(|| format!("Failed to read config file: {}", path))?
                .try_deserialize::<AppConfig>()
                .with_context(|| format!("Failed to parse config file: {}", path))?,
            None => AppConfig::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables take precedence over file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }

        if let Ok(port_str) = std::env::var("PORT") {
            match port_str.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port_str, "Ignoring invalid PORT"),
            }
        }

        if let Ok(key) = std::env::var("TOGETHER_API_KEY") {
            if !key.trim().is_empty() {
                self.upstream.api_key = Some(key);
            }
        }

        if let Ok(base) = std::env::var("TOGETHER_API_BASE") {
            self.upstream.api_base = base;
        }

        if let Ok(timeout_str) = std::env::var("REQUEST_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.upstream.request_timeout_secs = Some(timeout),
                Err(_) => {
                    tracing::warn!(value = %timeout_str, "Ignoring invalid REQUEST_TIMEOUT_SECS")
                }
            }
        }

        if let Ok(verify_ssl_str) = std::env::var("VERIFY_SSL") {
            self.upstream.verify_ssl = str_to_bool(&verify_ssl_str);
        }

        self.upstream.api_base = self.upstream.api_base.trim_end_matches('/').to_string();
    }
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
