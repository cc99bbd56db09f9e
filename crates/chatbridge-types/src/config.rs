//! Configuration types for Chat Bridge.
//!
//! `BridgeConfig` represents the top-level `chatbridge.toml`. Every section
//! and field has a default, so an empty file is a valid configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub conversation: ConversationDefaults,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub endpoints: EndpointOverrides,

    /// Extra request headers per provider id, e.g. `[headers.openrouter]`.
    /// Only OpenAI-compatible providers send them.
    #[serde(default)]
    pub headers: BTreeMap<String, BTreeMap<String, String>>,
}

/// Defaults applied to conversation requests that omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationDefaults {
    #[serde(default = "default_max_rounds")]
    pub default_max_rounds: u32,

    #[serde(default = "default_memory_window")]
    pub default_memory_window: usize,

    /// Pause between turns so the stream stays perceptible.
    #[serde(default = "default_turn_delay_ms")]
    pub turn_delay_ms: u64,
}

fn default_max_rounds() -> u32 {
    30
}

fn default_memory_window() -> usize {
    8
}

fn default_turn_delay_ms() -> u64 {
    50
}

impl Default for ConversationDefaults {
    fn default() -> Self {
        Self {
            default_max_rounds: default_max_rounds(),
            default_memory_window: default_memory_window(),
            turn_delay_ms: default_turn_delay_ms(),
        }
    }
}

/// Outbound HTTP and worker pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Fixed timeout for every outbound provider call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on concurrently running blocking adapter calls.
    #[serde(default = "default_max_blocking_calls")]
    pub max_blocking_calls: usize,

    /// `max_tokens` sent to the Anthropic Messages API.
    #[serde(default = "default_anthropic_max_tokens")]
    pub anthropic_max_tokens: u32,
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_blocking_calls() -> usize {
    8
}

fn default_anthropic_max_tokens() -> u32 {
    1024
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            max_blocking_calls: default_max_blocking_calls(),
            anthropic_max_tokens: default_anthropic_max_tokens(),
        }
    }
}

/// Optional base URL overrides per provider.
///
/// Environment variables (e.g. `OLLAMA_BASE_URL`) take precedence over these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointOverrides {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub gemini: Option<String>,
    pub ollama: Option<String>,
    pub lmstudio: Option<String>,
    pub autogen: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_config_default_values() {
        let config = BridgeConfig::default();
        assert_eq!(config.conversation.default_max_rounds, 30);
        assert_eq!(config.conversation.default_memory_window, 8);
        assert_eq!(config.conversation.turn_delay_ms, 50);
        assert_eq!(config.http.request_timeout_secs, 60);
        assert_eq!(config.http.anthropic_max_tokens, 1024);
        assert!(config.endpoints.ollama.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
[conversation]
turn_delay_ms = 0

[endpoints]
ollama = "http://gpu-box:11434/v1"

[headers.openrouter]
HTTP-Referer = "https://chatbridge.local"
X-Title = "Chat Bridge"
"#,
        )
        .unwrap();
        assert_eq!(config.conversation.turn_delay_ms, 0);
        assert_eq!(config.conversation.default_max_rounds, 30);
        assert_eq!(config.http.max_blocking_calls, 8);
        assert_eq!(config.endpoints.ollama.as_deref(), Some("http://gpu-box:11434/v1"));
        assert_eq!(config.headers["openrouter"]["X-Title"], "Chat Bridge");
        assert!(!config.headers.contains_key("openai"));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: BridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
    }
}
