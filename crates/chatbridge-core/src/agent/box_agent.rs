//! BoxChatAgent -- object-safe dynamic dispatch wrapper for ChatAgent.
//!
//! 1. Define an object-safe `ChatAgentDyn` trait with boxed futures
//! 2. Blanket-impl `ChatAgentDyn` for all `T: ChatAgent`
//! 3. `BoxChatAgent` wraps `Box<dyn ChatAgentDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use chatbridge_types::error::ProviderError;
use chatbridge_types::provider::ProviderKind;

use super::chat_agent::ChatAgent;

/// Object-safe version of [`ChatAgent`] with boxed futures.
pub trait ChatAgentDyn: Send + Sync {
    fn provider(&self) -> ProviderKind;

    fn model(&self) -> &str;

    fn generate_reply_boxed<'a>(
        &'a self,
        context: &'a str,
        memory_window: usize,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;
}

impl<T: ChatAgent> ChatAgentDyn for T {
    fn provider(&self) -> ProviderKind {
        ChatAgent::provider(self)
    }

    fn model(&self) -> &str {
        ChatAgent::model(self)
    }

    fn generate_reply_boxed<'a>(
        &'a self,
        context: &'a str,
        memory_window: usize,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(self.generate_reply(context, memory_window))
    }
}

/// Type-erased chat agent, selected at runtime by provider id.
pub struct BoxChatAgent {
    inner: Box<dyn ChatAgentDyn>,
}

impl BoxChatAgent {
    pub fn new<T: ChatAgent + 'static>(agent: T) -> Self {
        Self {
            inner: Box::new(agent),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.inner.provider()
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    pub async fn generate_reply(
        &self,
        context: &str,
        memory_window: usize,
    ) -> Result<String, ProviderError> {
        self.inner.generate_reply_boxed(context, memory_window).await
    }
}

impl std::fmt::Debug for BoxChatAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxChatAgent")
            .field("provider", &self.provider())
            .field("model", &self.model())
            .finish()
    }
}
