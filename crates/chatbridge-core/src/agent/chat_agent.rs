//! ChatAgent trait -- the capability every provider adapter implements.
//!
//! Uses native async fn in traits (RPITIT, Rust 2024). Not object-safe;
//! see [`super::box_agent::BoxChatAgent`] for dynamic dispatch.

use chatbridge_types::error::ProviderError;
use chatbridge_types::provider::ProviderKind;

/// Produces one reply from a pre-built conversational context.
///
/// Implementations own their resolved model, temperature, system prompt,
/// and credential for their whole lifetime. They never see the conversation
/// itself, only the context string the orchestrator builds for each turn.
pub trait ChatAgent: Send + Sync {
    /// Which backend this agent talks to.
    fn provider(&self) -> ProviderKind;

    /// The resolved model identifier.
    fn model(&self) -> &str;

    /// Generate a single reply.
    ///
    /// `memory_window` is advisory; the context has already been trimmed.
    /// Succeeds only with non-empty text; empty or malformed backend output
    /// is a [`ProviderError`].
    fn generate_reply(
        &self,
        context: &str,
        memory_window: usize,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}
