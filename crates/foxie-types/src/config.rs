//! Global configuration types for Foxie.
//!
//! `AppConfig` represents the top-level `foxie.toml` that controls the HTTP
//! listener, completion settings, and the blob store endpoint. Secrets are
//! never part of this file; they come from the environment.

use serde::{Deserialize, Serialize};

/// Deployment environment. Raw upstream error text is only exposed to
/// clients outside production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Top-level configuration for the Foxie backend.
///
/// Loaded from `~/.foxie/foxie.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub blob_store: BlobStoreConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Fixed completion parameters. Not tunable per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds for a single completion call.
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f64 {
    0.7
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_completion_timeout_secs() -> u64 {
    60
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            api_base: default_api_base(),
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

/// Blob store endpoint. Credentials are read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStoreConfig {
    #[serde(default = "default_blob_api_base")]
    pub api_base: String,
    /// Request timeout in seconds for existence checks and deletes.
    #[serde(default = "default_blob_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_blob_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_blob_timeout_secs() -> u64 {
    30
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            api_base: default_blob_api_base(),
            timeout_secs: default_blob_timeout_secs(),
        }
    }
}
