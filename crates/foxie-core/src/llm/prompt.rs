//! Completion request assembly.
//!
//! Every reply is requested the same way: the fixed system preamble, the
//! session history in order, then the prompt being answered as the final
//! user turn. Generation length and temperature are configuration
//! constants, never per-call arguments.

use foxie_types::chat::ChatMessage;
use foxie_types::config::CompletionConfig;
use foxie_types::llm::{CompletionRequest, Message, MessageRole};

/// Fixed parameters applied to every completion call.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        CompletionConfig::default().into()
    }
}

impl From<CompletionConfig> for CompletionSettings {
    fn from(config: CompletionConfig) -> Self {
        Self {
            model: config.model,
            system_prompt: config.system_prompt,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Build the request for one assistant reply to `prompt`.
///
/// `history` is everything that precedes the prompt; it must not already
/// contain the prompt itself.
pub fn build_completion_request(
    settings: &CompletionSettings,
    history: &[ChatMessage],
    prompt: &str,
) -> CompletionRequest {
    let mut messages: Vec<Message> = history
        .iter()
        .map(|m| Message {
            role: m.role,
            content: m.content.clone(),
        })
        .collect();

    messages.push(Message {
        role: MessageRole::User,
        content: prompt.to_string(),
    });

    CompletionRequest {
        model: settings.model.clone(),
        messages,
        system: Some(settings.system_prompt.clone()),
        max_tokens: settings.max_tokens,
        temperature: Some(settings.temperature),
    }
}
