//! AnthropicAgent -- [`ChatAgent`] for the Anthropic Messages API.
//!
//! The API key travels in `x-api-key` alongside a fixed `anthropic-version`
//! header. It is held as a [`SecretString`] and only exposed when building
//! the request.

pub mod types;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use chatbridge_core::agent::chat_agent::ChatAgent;
use chatbridge_types::error::{BridgeError, ProviderError};
use chatbridge_types::provider::ProviderKind;

use self::types::{AnthropicMessage, AnthropicRequest, AnthropicResponse};

pub struct AnthropicConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub temperature: f64,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

// No Debug: holds the API key.
pub struct AnthropicAgent {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    temperature: f64,
    system_prompt: String,
    max_tokens: u32,
}

impl AnthropicAgent {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(config: AnthropicConfig) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BridgeError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
            temperature: config.temperature,
            system_prompt: config.system_prompt,
            max_tokens: config.max_tokens,
        })
    }

    fn build_request(&self, context: &str) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: self.system_prompt.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: context.to_string(),
            }],
        }
    }
}

impl ChatAgent for AnthropicAgent {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_reply(&self, context: &str, _memory_window: usize) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .json(&self.build_request(context))
            .send()
            .await
            .map_err(|e| ProviderError::transport(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::http_status(
                status.as_u16(),
                format!("Anthropic request failed ({}): {body}", status.as_u16()),
            ));
        }

        let message: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(format!("failed to parse Anthropic response: {e}")))?;
        message.into_reply()
    }
}
