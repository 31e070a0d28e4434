//! Configuration for the OpenAI-compatible chat completion provider.

use std::time::Duration;

use secrecy::SecretString;

/// Default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: SecretString,
    /// Model used when a request leaves its model empty.
    pub model: String,
    /// Whole-request timeout. A stalled upstream fails with `LlmError::Timeout`.
    pub timeout: Duration,
}

/// OpenAI default configuration.
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_API_BASE.into(),
        api_key,
        model: model.into(),
        timeout: DEFAULT_TIMEOUT,
    }
}
