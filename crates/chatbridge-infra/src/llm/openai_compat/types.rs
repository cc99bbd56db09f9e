//! Chat Completions wire types shared by the OpenAI-compatible and
//! AutoGen-style adapters.

use serde::{Deserialize, Serialize};

use chatbridge_types::error::ProviderError;

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    /// Legacy completions field, still returned by some local servers.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, preferring `message.content` over `text`.
    pub fn into_reply(self) -> Result<String, ProviderError> {
        let Some(choice) = self.choices.into_iter().next() else {
            return Err(ProviderError::empty_response(
                "Provider returned no completion choices.",
            ));
        };

        let content = choice
            .message
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .or(choice.text)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        content.ok_or_else(|| ProviderError::empty_response("Provider response missing content."))
    }
}
