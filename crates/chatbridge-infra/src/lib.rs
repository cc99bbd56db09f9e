//! Infrastructure for Chat Bridge.
//!
//! Concrete [`ChatAgent`](chatbridge_core::agent::chat_agent::ChatAgent)
//! adapters for every supported provider, the [`factory::AgentFactory`]
//! that builds them, the bounded blocking worker pool, configuration
//! loading, and the read-only persona library.

pub mod config;
pub mod endpoints;
pub mod env;
pub mod factory;
pub mod llm;
pub mod persona;
pub mod worker;
