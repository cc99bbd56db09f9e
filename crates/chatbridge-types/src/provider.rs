//! Provider metadata and per-side agent configuration.
//!
//! A [`ProviderKind`] names one of the backends the bridge can talk to. Each
//! kind has exactly one [`ProviderSpec`] in the catalog held by
//! `chatbridge-core`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// System prompt used when neither the request nor a persona supplies one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Identifier of a supported AI backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "openrouter")]
    OpenRouter,
    Ollama,
    #[serde(rename = "lmstudio")]
    LmStudio,
    #[serde(rename = "autogen")]
    AutoGen,
}

impl ProviderKind {
    /// All provider kinds in their stable catalog order.
    pub const ALL: [ProviderKind; 8] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Gemini,
        ProviderKind::DeepSeek,
        ProviderKind::OpenRouter,
        ProviderKind::Ollama,
        ProviderKind::LmStudio,
        ProviderKind::AutoGen,
    ];

    /// The wire identifier (e.g. `"openai"`, `"lmstudio"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Ollama => "ollama",
            ProviderKind::LmStudio => "lmstudio",
            ProviderKind::AutoGen => "autogen",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("invalid provider: '{s}'"))
    }
}

/// Static metadata describing one provider.
///
/// Immutable; the full set is built once at process start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSpec {
    pub id: ProviderKind,
    pub label: &'static str,
    pub description: &'static str,
    /// Whether an API credential is required to construct an agent.
    pub needs_credential: bool,
    /// Configuration key the credential is looked up under (e.g. `OPENAI_API_KEY`).
    pub credential_key: Option<&'static str>,
    pub default_model: &'static str,
    pub default_system_prompt: &'static str,
}

impl ProviderSpec {
    /// The requested model when it is non-blank, otherwise `default_model`.
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim) {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => self.default_model.to_string(),
        }
    }

    /// The requested system prompt when it is non-blank, otherwise `default_system_prompt`.
    pub fn resolve_system_prompt(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim) {
            Some(prompt) if !prompt.is_empty() => prompt.to_string(),
            _ => self.default_system_prompt.to_string(),
        }
    }
}

/// Result of a credential-only readiness check for a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub label: String,
    pub connected: bool,
    pub error: Option<String>,
}

/// Fully resolved configuration for one side of a conversation.
///
/// Produced once per conversation per side; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub provider: ProviderKind,
    pub model: String,
    /// Passed through to the backend uninterpreted (no clamping).
    pub temperature: f64,
    pub system_prompt: String,
    /// Display label attached to every message this side authors.
    pub persona: Option<String>,
}
