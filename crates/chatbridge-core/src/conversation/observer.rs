//! Observers receive conversation events as they happen.

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

use chatbridge_types::conversation::ConversationEvent;

/// The observer can no longer receive events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("observer disconnected")]
pub struct ObserverClosed;

/// Sink for [`ConversationEvent`]s emitted while a conversation runs.
///
/// A failed `send` is treated as a disconnect: the orchestrator stops
/// generating turns for this conversation.
pub trait ConversationObserver: Send {
    fn send(
        &mut self,
        event: ConversationEvent,
    ) -> impl Future<Output = Result<(), ObserverClosed>> + Send;
}

impl ConversationObserver for mpsc::Sender<ConversationEvent> {
    async fn send(&mut self, event: ConversationEvent) -> Result<(), ObserverClosed> {
        mpsc::Sender::send(self, event).await.map_err(|_| ObserverClosed)
    }
}

impl ConversationObserver for mpsc::UnboundedSender<ConversationEvent> {
    async fn send(&mut self, event: ConversationEvent) -> Result<(), ObserverClosed> {
        mpsc::UnboundedSender::send(self, event).map_err(|_| ObserverClosed)
    }
}
