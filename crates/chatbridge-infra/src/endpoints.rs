//! Base URL resolution per provider.
//!
//! Precedence: environment variable, then the `[endpoints]` table of the
//! config file, then the built-in default.

use chatbridge_core::provider::credential::ConfigSource;
use chatbridge_types::config::EndpointOverrides;
use chatbridge_types::provider::ProviderKind;

pub const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1";
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";
pub const DEEPSEEK_URL: &str = "https://api.deepseek.com/v1";
pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434/v1";
pub const LMSTUDIO_DEFAULT_URL: &str = "http://localhost:1234/v1";
pub const ANTHROPIC_DEFAULT_URL: &str = "https://api.anthropic.com";
pub const GEMINI_DEFAULT_URL: &str = "https://generativelanguage.googleapis.com";

/// Resolved base URL for every provider, without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub openai: String,
    pub anthropic: String,
    pub gemini: String,
    pub deepseek: String,
    pub openrouter: String,
    pub ollama: String,
    pub lmstudio: String,
    pub autogen: String,
}

impl Endpoints {
    pub fn resolve(overrides: &EndpointOverrides, env: &dyn ConfigSource) -> Self {
        let openai = pick(env, "OPENAI_BASE_URL", overrides.openai.as_deref())
            .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string());
        let autogen = pick(env, "AUTOGEN_BASE_URL", overrides.autogen.as_deref())
            .unwrap_or_else(|| openai.clone());

        Self {
            anthropic: non_blank(overrides.anthropic.as_deref())
                .unwrap_or_else(|| ANTHROPIC_DEFAULT_URL.to_string()),
            gemini: non_blank(overrides.gemini.as_deref())
                .unwrap_or_else(|| GEMINI_DEFAULT_URL.to_string()),
            deepseek: DEEPSEEK_URL.to_string(),
            openrouter: OPENROUTER_URL.to_string(),
            ollama: pick(env, "OLLAMA_BASE_URL", overrides.ollama.as_deref())
                .unwrap_or_else(|| OLLAMA_DEFAULT_URL.to_string()),
            lmstudio: pick(env, "LMSTUDIO_BASE_URL", overrides.lmstudio.as_deref())
                .unwrap_or_else(|| LMSTUDIO_DEFAULT_URL.to_string()),
            openai,
            autogen,
        }
    }

    pub fn base_url(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::DeepSeek => &self.deepseek,
            ProviderKind::OpenRouter => &self.openrouter,
            ProviderKind::Ollama => &self.ollama,
            ProviderKind::LmStudio => &self.lmstudio,
            ProviderKind::AutoGen => &self.autogen,
        }
    }
}

fn pick(env: &dyn ConfigSource, env_key: &str, file_value: Option<&str>) -> Option<String> {
    non_blank(env.lookup(env_key).as_deref()).or_else(|| non_blank(file_value))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().trim_end_matches('/'))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
