//! Conversation state, storage, observers, and the turn-taking orchestrator.

pub mod observer;
pub mod orchestrator;
pub mod state;
pub mod store;
pub mod transcript;
