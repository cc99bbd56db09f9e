//! AgentFactory -- builds a concrete adapter for one side of a conversation.
//!
//! Credentials are checked before anything is constructed, and construction
//! performs no network I/O. Base URLs are resolved once when the factory is
//! created.

use std::collections::BTreeMap;
use std::time::Duration;

use secrecy::SecretString;
use tracing::debug;

use chatbridge_core::agent::box_agent::BoxChatAgent;
use chatbridge_core::conversation::orchestrator::AgentBuilder;
use chatbridge_core::provider::credential::{ConfigSource, ensure_credential};
use chatbridge_core::provider::registry::ProviderRegistry;
use chatbridge_types::config::BridgeConfig;
use chatbridge_types::conversation::Side;
use chatbridge_types::error::BridgeError;
use chatbridge_types::provider::{AgentConfig, ProviderKind, ProviderSpec};

use crate::endpoints::Endpoints;
use crate::llm::ProviderAgent;
use crate::llm::anthropic::{AnthropicAgent, AnthropicConfig};
use crate::llm::autogen::{AutoGenAgent, AutoGenConfig, LlmConfig};
use crate::llm::gemini::{GeminiAgent, GeminiConfig};
use crate::llm::openai_compat::{OpenAiCompatConfig, OpenAiCompatibleAgent};
use crate::worker::BlockingPool;

pub struct AgentFactory {
    registry: ProviderRegistry,
    endpoints: Endpoints,
    timeout: Duration,
    anthropic_max_tokens: u32,
    headers: BTreeMap<String, BTreeMap<String, String>>,
    pool: BlockingPool,
}

impl AgentFactory {
    /// Resolve endpoints from `config` and `env`, and size the blocking pool.
    pub fn new(config: &BridgeConfig, env: &dyn ConfigSource) -> Self {
        Self {
            registry: ProviderRegistry::builtin(),
            endpoints: Endpoints::resolve(&config.endpoints, env),
            timeout: Duration::from_secs(config.http.request_timeout_secs),
            anthropic_max_tokens: config.http.anthropic_max_tokens,
            headers: config.headers.clone(),
            pool: BlockingPool::new(config.http.max_blocking_calls),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Build an agent from a raw provider identifier (case-insensitive).
    ///
    /// Blank `model` or `system_prompt` fall back to the provider defaults.
    pub fn create_agent(
        &self,
        side: Side,
        provider_id: &str,
        model: Option<&str>,
        temperature: f64,
        system_prompt: Option<&str>,
        credentials: &dyn ConfigSource,
    ) -> Result<BoxChatAgent, BridgeError> {
        let kind: ProviderKind = provider_id
            .parse()
            .map_err(|_| BridgeError::UnsupportedProvider(provider_id.to_string()))?;
        let spec = self.registry.spec_for(kind)?;
        let config = AgentConfig {
            provider: kind,
            model: spec.resolve_model(model),
            temperature,
            system_prompt: spec.resolve_system_prompt(system_prompt),
            persona: None,
        };
        Ok(BoxChatAgent::new(self.build(side, &config, credentials)?))
    }

    /// Construct the adapter variant for an already-resolved configuration.
    pub fn build(
        &self,
        side: Side,
        config: &AgentConfig,
        credentials: &dyn ConfigSource,
    ) -> Result<ProviderAgent, BridgeError> {
        let spec = self.registry.spec_for(config.provider)?;
        let credential = ensure_credential(spec, credentials)?;
        let base_url = self.endpoints.base_url(config.provider).to_string();

        debug!(
            side = %side,
            provider = %config.provider,
            model = %config.model,
            base_url = %base_url,
            "building agent"
        );

        let agent = match config.provider {
            ProviderKind::OpenAi
            | ProviderKind::DeepSeek
            | ProviderKind::OpenRouter
            | ProviderKind::Ollama
            | ProviderKind::LmStudio => {
                ProviderAgent::OpenAiCompatible(OpenAiCompatibleAgent::new(OpenAiCompatConfig {
                    provider: config.provider,
                    base_url,
                    api_key: credential,
                    model: config.model.clone(),
                    temperature: config.temperature,
                    system_prompt: config.system_prompt.clone(),
                    timeout: self.timeout,
                    extra_headers: self.extra_headers(config.provider),
                })?)
            }
            ProviderKind::Anthropic => ProviderAgent::Anthropic(AnthropicAgent::new(AnthropicConfig {
                base_url,
                api_key: required(spec, credential)?,
                model: config.model.clone(),
                temperature: config.temperature,
                system_prompt: config.system_prompt.clone(),
                max_tokens: self.anthropic_max_tokens,
                timeout: self.timeout,
            })?),
            ProviderKind::Gemini => ProviderAgent::Gemini(GeminiAgent::new(
                GeminiConfig {
                    base_url,
                    api_key: required(spec, credential)?,
                    model: config.model.clone(),
                    temperature: config.temperature,
                    system_prompt: config.system_prompt.clone(),
                    timeout: self.timeout,
                },
                self.pool.clone(),
            )),
            ProviderKind::AutoGen => ProviderAgent::AutoGen(AutoGenAgent::new(
                AutoGenConfig {
                    name: side.to_string(),
                    llm: LlmConfig {
                        model: config.model.clone(),
                        api_key: required(spec, credential)?,
                        base_url,
                        temperature: config.temperature,
                        timeout: self.timeout,
                    },
                    system_prompt: config.system_prompt.clone(),
                },
                self.pool.clone(),
            )),
        };
        Ok(agent)
    }
}

impl AgentFactory {
    fn extra_headers(&self, provider: ProviderKind) -> Vec<(String, String)> {
        self.headers
            .get(provider.as_str())
            .map(|headers| {
                headers
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl AgentBuilder for AgentFactory {
    fn build_agent(
        &self,
        side: Side,
        config: &AgentConfig,
        credentials: &dyn ConfigSource,
    ) -> Result<BoxChatAgent, BridgeError> {
        Ok(BoxChatAgent::new(self.build(side, config, credentials)?))
    }
}

/// Adapters that cannot run keyless.
fn required(spec: &ProviderSpec, credential: Option<SecretString>) -> Result<SecretString, BridgeError> {
    credential.ok_or_else(|| match spec.credential_key {
        Some(key) => BridgeError::MissingCredential {
            label: spec.label.to_string(),
            key: key.to_string(),
        },
        None => BridgeError::MisconfiguredProvider {
            label: spec.label.to_string(),
        },
    })
}
