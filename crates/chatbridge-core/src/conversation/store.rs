//! Concurrent in-memory conversation store.
//!
//! Conversations live for the lifetime of the process; there is no eviction
//! or persistence.

use std::sync::Arc;

use dashmap::DashMap;

use chatbridge_types::conversation::ConversationId;

use super::state::Conversation;

#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: DashMap<ConversationId, Arc<Conversation>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, conversation: Conversation) -> Arc<Conversation> {
        let conversation = Arc::new(conversation);
        self.conversations
            .insert(conversation.id(), Arc::clone(&conversation));
        conversation
    }

    pub fn get(&self, id: &ConversationId) -> Option<Arc<Conversation>> {
        self.conversations.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
