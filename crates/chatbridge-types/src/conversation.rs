//! Conversation messages, observer events, and lifecycle status.
//!
//! Messages are append-only: a message's identity is its position in the
//! transcript. Events are what an observer receives while a conversation
//! streams.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// Identifier of a conversation (UUID v7, time-sortable).
pub type ConversationId = Uuid;

/// One of the two agent seats in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The message sender tag for replies produced by this side.
    pub fn sender(&self) -> Sender {
        match self {
            Side::A => Sender::AgentA,
            Side::B => Sender::AgentB,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    AgentA,
    AgentB,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::AgentA => write!(f, "agent_a"),
            Sender::AgentB => write!(f, "agent_b"),
        }
    }
}

/// A single message in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeMessage {
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub persona: Option<String>,
}

impl BridgeMessage {
    /// The opening message supplied by the caller.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            persona: None,
        }
    }

    /// A reply authored by one of the agents.
    pub fn agent(side: Side, content: impl Into<String>, persona: Option<String>) -> Self {
        Self {
            content: content.into(),
            sender: side.sender(),
            timestamp: Utc::now(),
            persona,
        }
    }
}

/// Event delivered to a conversation observer.
///
/// Serialized as `{"type": "...", "data": ...}`; `conversation_end` carries no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ConversationEvent {
    Message(BridgeMessage),
    Error(String),
    ConversationEnd,
}

/// Lifecycle of a conversation.
///
/// `Created -> Running -> {Completed, Aborted}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Created,
    Running,
    Completed,
    Aborted,
}

impl ConversationStatus {
    /// `Created` and `Running` conversations are active; the rest are terminal.
    pub fn is_active(&self) -> bool {
        matches!(self, ConversationStatus::Created | ConversationStatus::Running)
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::Created => write!(f, "created"),
            ConversationStatus::Running => write!(f, "running"),
            ConversationStatus::Completed => write!(f, "completed"),
            ConversationStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// Bounds applied to a conversation's turn loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSettings {
    /// Number of full A-then-B rounds before the conversation completes.
    pub max_rounds: u32,
    /// How many trailing messages are joined into each turn's context.
    pub memory_window: usize,
}
