//! OpenAI-compatible chat agent.
//!
//! One [`OpenAiCompatibleAgent`] serves OpenAI, DeepSeek, OpenRouter, and the
//! local Ollama and LM Studio servers. Only the base URL, whether a bearer
//! token is sent, and any extra headers differ between them.

pub mod types;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use chatbridge_core::agent::chat_agent::ChatAgent;
use chatbridge_types::error::{BridgeError, ProviderError};
use chatbridge_types::provider::ProviderKind;

use self::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Configuration for an [`OpenAiCompatibleAgent`].
pub struct OpenAiCompatConfig {
    pub provider: ProviderKind,
    /// e.g. `https://api.openai.com/v1`; `/chat/completions` is appended.
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f64,
    pub system_prompt: String,
    pub timeout: Duration,
    /// Sent after the bearer token, replacing any header of the same name.
    pub extra_headers: Vec<(String, String)>,
}

/// Agent for any endpoint speaking the Chat Completions protocol.
///
/// Does NOT derive Debug: it holds the API key.
pub struct OpenAiCompatibleAgent {
    client: reqwest::Client,
    provider: ProviderKind,
    base_url: String,
    api_key: Option<SecretString>,
    extra_headers: HeaderMap,
    model: String,
    temperature: f64,
    system_prompt: String,
}

impl OpenAiCompatibleAgent {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BridgeError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            provider: config.provider,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            extra_headers: header_map(&config.extra_headers)?,
            model: config.model,
            temperature: config.temperature,
            system_prompt: config.system_prompt,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, context: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(context),
            ],
            temperature: self.temperature,
        }
    }
}

impl ChatAgent for OpenAiCompatibleAgent {
    fn provider(&self) -> ProviderKind {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_reply(&self, context: &str, _memory_window: usize) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut request = self.client.post(&url).json(&self.build_request(context));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }
        request = request.headers(self.extra_headers.clone());

        let response = request.send().await.map_err(|e| {
            ProviderError::transport(format!("OpenAI-compatible request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::http_status(
                status.as_u16(),
                format!("OpenAI-compatible request failed ({}): {body}", status.as_u16()),
            ));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::decode(format!("failed to parse completion response: {e}"))
        })?;
        completion.into_reply()
    }
}

fn header_map(pairs: &[(String, String)]) -> Result<HeaderMap, BridgeError> {
    let mut headers = HeaderMap::new();
    for (key, value) in pairs {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| BridgeError::Internal(format!("invalid header name '{key}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| BridgeError::Internal(format!("invalid value for header '{key}': {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
