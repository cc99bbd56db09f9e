//! Provider adapters.
//!
//! Every backend is one variant of the closed [`ProviderAgent`] enum. Callers
//! only ever see the [`ChatAgent`] capability; protocol differences stay in
//! the variant modules.

pub mod anthropic;
pub mod autogen;
pub mod gemini;
pub mod openai_compat;

#[cfg(test)]
pub(crate) mod test_support;

use chatbridge_core::agent::chat_agent::ChatAgent;
use chatbridge_types::error::ProviderError;
use chatbridge_types::provider::ProviderKind;

use self::anthropic::AnthropicAgent;
use self::autogen::AutoGenAgent;
use self::gemini::GeminiAgent;
use self::openai_compat::OpenAiCompatibleAgent;

/// One concrete adapter per wire protocol.
pub enum ProviderAgent {
    /// OpenAI, DeepSeek, OpenRouter, Ollama, LM Studio.
    OpenAiCompatible(OpenAiCompatibleAgent),
    Anthropic(AnthropicAgent),
    /// Blocking SDK-style call on the worker pool.
    Gemini(GeminiAgent),
    /// Blocking framework-style assistant on the worker pool.
    AutoGen(AutoGenAgent),
}

impl ChatAgent for ProviderAgent {
    fn provider(&self) -> ProviderKind {
        match self {
            ProviderAgent::OpenAiCompatible(agent) => agent.provider(),
            ProviderAgent::Anthropic(agent) => agent.provider(),
            ProviderAgent::Gemini(agent) => agent.provider(),
            ProviderAgent::AutoGen(agent) => agent.provider(),
        }
    }

    fn model(&self) -> &str {
        match self {
            ProviderAgent::OpenAiCompatible(agent) => agent.model(),
            ProviderAgent::Anthropic(agent) => agent.model(),
            ProviderAgent::Gemini(agent) => agent.model(),
            ProviderAgent::AutoGen(agent) => agent.model(),
        }
    }

    async fn generate_reply(&self, context: &str, memory_window: usize) -> Result<String, ProviderError> {
        match self {
            ProviderAgent::OpenAiCompatible(agent) => agent.generate_reply(context, memory_window).await,
            ProviderAgent::Anthropic(agent) => agent.generate_reply(context, memory_window).await,
            ProviderAgent::Gemini(agent) => agent.generate_reply(context, memory_window).await,
            ProviderAgent::AutoGen(agent) => agent.generate_reply(context, memory_window).await,
        }
    }
}
