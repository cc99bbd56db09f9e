//! Static provider catalog.
//!
//! Maps each provider identifier to its [`ProviderSpec`]. The catalog is a
//! compile-time table; lookups of identifiers outside it are hard errors.

use chatbridge_types::error::BridgeError;
use chatbridge_types::provider::{DEFAULT_SYSTEM_PROMPT, ProviderKind, ProviderSpec};

static BUILTIN_PROVIDERS: [ProviderSpec; 8] = [
    ProviderSpec {
        id: ProviderKind::OpenAi,
        label: "OpenAI",
        description: "OpenAI Chat Completions (GPT models).",
        needs_credential: true,
        credential_key: Some("OPENAI_API_KEY"),
        default_model: "gpt-4o-mini",
        default_system_prompt: DEFAULT_SYSTEM_PROMPT,
    },
    ProviderSpec {
        id: ProviderKind::Anthropic,
        label: "Anthropic",
        description: "Anthropic Messages API (Claude models).",
        needs_credential: true,
        credential_key: Some("ANTHROPIC_API_KEY"),
        default_model: "claude-3-5-sonnet-20241022",
        default_system_prompt: DEFAULT_SYSTEM_PROMPT,
    },
    ProviderSpec {
        id: ProviderKind::Gemini,
        label: "Gemini",
        description: "Google Generative AI (Gemini).",
        needs_credential: true,
        credential_key: Some("GOOGLE_API_KEY"),
        default_model: "gemini-1.5-flash",
        default_system_prompt: DEFAULT_SYSTEM_PROMPT,
    },
    ProviderSpec {
        id: ProviderKind::DeepSeek,
        label: "DeepSeek",
        description: "DeepSeek OpenAI-compatible API.",
        needs_credential: true,
        credential_key: Some("DEEPSEEK_API_KEY"),
        default_model: "deepseek-chat",
        default_system_prompt: DEFAULT_SYSTEM_PROMPT,
    },
    ProviderSpec {
        id: ProviderKind::OpenRouter,
        label: "OpenRouter",
        description: "OpenRouter OpenAI-compatible API.",
        needs_credential: true,
        credential_key: Some("OPENROUTER_API_KEY"),
        default_model: "openai/gpt-4o-mini",
        default_system_prompt: DEFAULT_SYSTEM_PROMPT,
    },
    ProviderSpec {
        id: ProviderKind::Ollama,
        label: "Ollama",
        description: "Local Ollama server with OpenAI-compatible endpoint.",
        needs_credential: false,
        credential_key: None,
        default_model: "llama3.2:3b",
        default_system_prompt: DEFAULT_SYSTEM_PROMPT,
    },
    ProviderSpec {
        id: ProviderKind::LmStudio,
        label: "LM Studio",
        description: "Local LM Studio OpenAI-compatible endpoint.",
        needs_credential: false,
        credential_key: None,
        default_model: "local-model",
        default_system_prompt: DEFAULT_SYSTEM_PROMPT,
    },
    ProviderSpec {
        id: ProviderKind::AutoGen,
        label: "AutoGen",
        description: "AutoGen-style assistant agent (OpenAI-compatible backend).",
        needs_credential: true,
        credential_key: Some("OPENAI_API_KEY"),
        default_model: "gpt-4o-mini",
        default_system_prompt: DEFAULT_SYSTEM_PROMPT,
    },
];

/// Registry of provider specifications, indexed by identifier.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRegistry {
    specs: &'static [ProviderSpec],
}

impl ProviderRegistry {
    /// The built-in catalog of all supported providers.
    pub fn builtin() -> Self {
        Self {
            specs: &BUILTIN_PROVIDERS,
        }
    }

    /// A registry over a custom table.
    pub fn from_specs(specs: &'static [ProviderSpec]) -> Self {
        Self { specs }
    }

    /// Provider identifiers in stable catalog order.
    pub fn choices(&self) -> Vec<&'static str> {
        self.specs.iter().map(|spec| spec.id.as_str()).collect()
    }

    /// All specifications in catalog order.
    pub fn specs(&self) -> &'static [ProviderSpec] {
        self.specs
    }

    /// Look up a provider by identifier (case-insensitive, surrounding whitespace ignored).
    pub fn get_spec(&self, id: &str) -> Result<&'static ProviderSpec, BridgeError> {
        let wanted = id.trim().to_lowercase();
        self.specs
            .iter()
            .find(|spec| spec.id.as_str() == wanted)
            .ok_or_else(|| BridgeError::UnknownProvider(id.to_string()))
    }

    /// Look up the specification for an already-parsed provider kind.
    pub fn spec_for(&self, kind: ProviderKind) -> Result<&'static ProviderSpec, BridgeError> {
        self.get_spec(kind.as_str())
    }

    /// The requested model when non-blank, otherwise the provider default.
    pub fn resolve_model(&self, id: &str, requested: Option<&str>) -> Result<String, BridgeError> {
        Ok(self.get_spec(id)?.resolve_model(requested))
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
