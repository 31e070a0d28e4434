//! Completion provider implementations.
//!
//! Contains the concrete implementation of the [`LlmProvider`] trait
//! defined in `foxie-core` and a factory ([`create_provider`]) that builds
//! it from the completion configuration.
//!
//! [`LlmProvider`]: foxie_core::llm::provider::LlmProvider

pub mod openai_compat;

use std::time::Duration;

use secrecy::SecretString;

use foxie_core::llm::box_provider::BoxLlmProvider;
use foxie_core::llm::provider::LlmProvider;
use foxie_types::config::CompletionConfig;
use foxie_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Create a [`BoxLlmProvider`] from the completion configuration.
///
/// # Errors
///
/// Returns `LlmError::AuthenticationFailed` when no API key is available,
/// or `LlmError::Provider` when the HTTP client cannot be built.
pub fn create_provider(
    config: &CompletionConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let api_key = api_key.ok_or(LlmError::AuthenticationFailed)?;
    let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig {
        provider_name: "openai".to_string(),
        base_url: config.api_base.clone(),
        api_key,
        model: config.model.clone(),
        timeout: Duration::from_secs(config.timeout_secs),
    })?;
    Ok(BoxLlmProvider::new(provider))
}

/// Stand-in used when no API key is configured.
///
/// Every completion fails with `AuthenticationFailed`, so session reads
/// keep working while sends surface as upstream errors.
pub struct UnconfiguredProvider;

impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::AuthenticationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_with_key() {
        let provider =
            create_provider(&CompletionConfig::default(), Some(SecretString::from("sk-test")))
                .unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_provider_missing_key() {
        match create_provider(&CompletionConfig::default(), None) {
            Err(LlmError::AuthenticationFailed) => {}
            Err(other) => panic!("Expected AuthenticationFailed, got: {other}"),
            Ok(_) => panic!("Expected error but got Ok"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_provider_rejects_completions() {
        let provider = BoxLlmProvider::new(UnconfiguredProvider);
        let request = CompletionRequest {
            model: "gpt-4".to_string(),
            messages: vec![],
            system: None,
            max_tokens: 150,
            temperature: None,
        };
        assert_eq!(provider.name(), "unconfigured");
        assert!(matches!(
            provider.complete(&request).await,
            Err(LlmError::AuthenticationFailed)
        ));
    }
}
