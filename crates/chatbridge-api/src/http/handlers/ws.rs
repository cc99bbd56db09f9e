//! WebSocket observer stream for a single conversation.
//!
//! `/ws/conversations/{id}` upgrades to a WebSocket and attaches the socket
//! as the conversation's observer. Every [`ConversationEvent`] is pushed to
//! the client as a JSON text frame:
//!
//! - `{"type":"message","data":{"content":..,"sender":"agent_a",..}}`
//! - `{"type":"error","data":"<detail>"}`
//! - `{"type":"conversation_end"}`
//!
//! Incoming frames are ignored except for disconnect detection: a `Close`
//! frame, a receive error, or end of stream cancels the conversation, which
//! then completes after the turn in flight.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio_util::sync::CancellationToken;

use chatbridge_core::conversation::observer::{ConversationObserver, ObserverClosed};
use chatbridge_types::conversation::ConversationEvent;

use crate::http::handlers::conversation::parse_id;
use crate::state::AppState;

/// Writes conversation events to a WebSocket sink as JSON text frames.
pub struct SocketObserver<S> {
    sink: S,
}

impl<S> SocketObserver<S>
where
    S: Sink<Message> + Unpin + Send,
{
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Close the socket after the final event.
    pub async fn close(&mut self) {
        if self.sink.close().await.is_err() {
            tracing::debug!("WebSocket already closed");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> S {
        self.sink
    }
}

impl<S> ConversationObserver for SocketObserver<S>
where
    S: Sink<Message> + Unpin + Send,
{
    async fn send(&mut self, event: ConversationEvent) -> Result<(), ObserverClosed> {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!("Failed to serialize ConversationEvent: {err}");
                return Err(ObserverClosed);
            }
        };
        self.sink
            .send(Message::Text(json.into()))
            .await
            .map_err(|_| ObserverClosed)
    }
}

/// Upgrade an HTTP request to a conversation observer stream.
///
/// Mounted at `/ws/conversations/{id}`.
pub async fn ws_conversation(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_conversation_socket(socket, state, id))
}

async fn handle_conversation_socket(socket: WebSocket, state: AppState, raw_id: String) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let mut observer = SocketObserver::new(ws_sender);
    let cancel = CancellationToken::new();

    let reader_cancel = cancel.clone();
    let reader = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Err(err) => {
                    tracing::debug!("WebSocket receive error: {err}");
                    break;
                }
                // Client chatter and protocol frames carry no commands.
                Ok(_) => {}
            }
        }
        reader_cancel.cancel();
    });

    match parse_id(&raw_id) {
        Ok(id) => match state.orchestrator.run(&id, &mut observer, cancel).await {
            Ok(status) => tracing::debug!(conversation_id = %id, %status, "observer stream finished"),
            Err(err) => tracing::info!(conversation_id = %id, "observer rejected: {err}"),
        },
        Err(err) => {
            let _ = observer.send(ConversationEvent::Error(err.to_string())).await;
        }
    }

    observer.close().await;
    reader.abort();
    tracing::debug!("WebSocket connection closed");
}
