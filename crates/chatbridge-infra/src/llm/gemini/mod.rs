//! GeminiAgent -- SDK-style [`ChatAgent`] for Google Generative AI.
//!
//! Mirrors the shape of the vendor SDK: a [`GenerativeModel`] handle is
//! configured with the credential and system instruction, then
//! `generate_content` is called with a temperature-only generation config.
//! The call is synchronous and always runs on the [`BlockingPool`].

pub mod types;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use chatbridge_core::agent::chat_agent::ChatAgent;
use chatbridge_types::error::ProviderError;
use chatbridge_types::provider::ProviderKind;

use crate::worker::BlockingPool;

use self::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// A blocking model handle, created per call.
pub struct GenerativeModel {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: SecretString,
    model_name: String,
    system_instruction: Option<String>,
}

impl GenerativeModel {
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        model_name: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::transport(format!("failed to create Gemini client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model_name: model_name.to_string(),
            system_instruction: None,
        })
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Blocking `models/{model}:generateContent` call.
    pub fn generate_content(
        &self,
        prompt: &str,
        generation_config: GenerationConfig,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        );
        let body = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: self.system_instruction.clone().map(Content::instruction),
            generation_config,
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .map_err(|e| ProviderError::transport(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::http_status(
                status.as_u16(),
                format!("Gemini request failed ({}): {body}", status.as_u16()),
            ));
        }

        response
            .json()
            .map_err(|e| ProviderError::decode(format!("failed to parse Gemini response: {e}")))
    }
}

pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub temperature: f64,
    pub system_prompt: String,
    pub timeout: Duration,
}

// No Debug: holds the API key.
pub struct GeminiAgent {
    config: GeminiConfig,
    pool: BlockingPool,
}

impl GeminiAgent {
    pub fn new(config: GeminiConfig, pool: BlockingPool) -> Self {
        Self { config, pool }
    }
}

impl ChatAgent for GeminiAgent {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate_reply(&self, context: &str, _memory_window: usize) -> Result<String, ProviderError> {
        let base_url = self.config.base_url.clone();
        let api_key = self.config.api_key.clone();
        let model = self.config.model.clone();
        let system_prompt = self.config.system_prompt.clone();
        let temperature = self.config.temperature;
        let timeout = self.config.timeout;
        let prompt = context.to_string();

        self.pool
            .run(move || {
                let model = GenerativeModel::new(&base_url, api_key, &model, timeout)?
                    .with_system_instruction(system_prompt);
                let response = model.generate_content(&prompt, GenerationConfig { temperature })?;
                let text = response.text();
                let text = text.trim();
                if text.is_empty() {
                    return Err(ProviderError::empty_response("Gemini response content was empty."));
                }
                debug!(chars = text.len(), "gemini reply received");
                Ok(text.to_string())
            })
            .await
    }
}
