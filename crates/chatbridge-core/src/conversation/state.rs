//! Per-conversation state shared between the store and the driving task.
//!
//! Only the task that claimed the agent pair appends messages, so the
//! transcript has a single writer. Readers (HTTP snapshot, transcript
//! export) take short read locks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use chatbridge_types::conversation::{
    BridgeMessage, ConversationId, ConversationSettings, ConversationStatus, Side,
};
use chatbridge_types::error::ConversationError;
use chatbridge_types::provider::AgentConfig;

use crate::agent::box_agent::BoxChatAgent;
use crate::agent::context::build_context;

/// The two agents of a conversation, one per side.
#[derive(Debug)]
pub struct AgentPair {
    pub a: BoxChatAgent,
    pub b: BoxChatAgent,
}

impl AgentPair {
    pub fn get(&self, side: Side) -> &BoxChatAgent {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }
}

#[derive(Debug)]
struct ConversationRecord {
    messages: Vec<BridgeMessage>,
    status: ConversationStatus,
    rounds_completed: u32,
}

/// Point-in-time copy of a conversation, safe to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub id: ConversationId,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub starter_message: String,
    pub settings: ConversationSettings,
    pub agent_a: AgentConfig,
    pub agent_b: AgentConfig,
    pub rounds_completed: u32,
    pub messages: Vec<BridgeMessage>,
}

/// A single bridged conversation between two agents.
#[derive(Debug)]
pub struct Conversation {
    id: ConversationId,
    created_at: DateTime<Utc>,
    starter_message: String,
    settings: ConversationSettings,
    agent_a: AgentConfig,
    agent_b: AgentConfig,
    record: RwLock<ConversationRecord>,
    // Taken by the first observer that drives the conversation.
    agents: Mutex<Option<AgentPair>>,
}

impl Conversation {
    /// A new conversation whose transcript holds only the starter message.
    pub fn new(
        starter_message: impl Into<String>,
        settings: ConversationSettings,
        agent_a: AgentConfig,
        agent_b: AgentConfig,
        agents: AgentPair,
    ) -> Self {
        let starter_message = starter_message.into();
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            record: RwLock::new(ConversationRecord {
                messages: vec![BridgeMessage::user(starter_message.clone())],
                status: ConversationStatus::Created,
                rounds_completed: 0,
            }),
            starter_message,
            settings,
            agent_a,
            agent_b,
            agents: Mutex::new(Some(agents)),
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn starter_message(&self) -> &str {
        &self.starter_message
    }

    pub fn settings(&self) -> ConversationSettings {
        self.settings
    }

    pub fn agent_config(&self, side: Side) -> &AgentConfig {
        match side {
            Side::A => &self.agent_a,
            Side::B => &self.agent_b,
        }
    }

    pub async fn status(&self) -> ConversationStatus {
        self.record.read().await.status
    }

    pub async fn rounds_completed(&self) -> u32 {
        self.record.read().await.rounds_completed
    }

    pub async fn messages(&self) -> Vec<BridgeMessage> {
        self.record.read().await.messages.clone()
    }

    pub async fn snapshot(&self) -> ConversationSnapshot {
        let record = self.record.read().await;
        ConversationSnapshot {
            id: self.id,
            status: record.status,
            created_at: self.created_at,
            starter_message: self.starter_message.clone(),
            settings: self.settings,
            agent_a: self.agent_a.clone(),
            agent_b: self.agent_b.clone(),
            rounds_completed: record.rounds_completed,
            messages: record.messages.clone(),
        }
    }

    /// Take ownership of the agents and mark the conversation running.
    ///
    /// Fails with `Inactive` once the conversation has terminated and with
    /// `AlreadyStreaming` while another task is driving it.
    pub(crate) async fn claim(&self) -> Result<AgentPair, ConversationError> {
        let mut record = self.record.write().await;
        if !record.status.is_active() {
            return Err(ConversationError::Inactive);
        }
        let pair = self
            .agents
            .lock()
            .await
            .take()
            .ok_or(ConversationError::AlreadyStreaming)?;
        record.status = ConversationStatus::Running;
        Ok(pair)
    }

    pub(crate) async fn context(&self) -> String {
        let record = self.record.read().await;
        build_context(&record.messages, self.settings.memory_window)
    }

    pub(crate) async fn append(&self, message: BridgeMessage) {
        self.record.write().await.messages.push(message);
    }

    pub(crate) async fn complete_round(&self) -> u32 {
        let mut record = self.record.write().await;
        record.rounds_completed += 1;
        record.rounds_completed
    }

    pub(crate) async fn finish(&self, status: ConversationStatus) {
        self.record.write().await.status = status;
    }
}
