//! Business logic for Chat Bridge.
//!
//! This crate defines the provider catalog, credential resolution, the
//! `ChatAgent` capability that every backend adapter implements, and the
//! conversation orchestrator that drives two agents turn by turn. It depends
//! only on `chatbridge-types` -- never on `chatbridge-infra` or any network crate.

pub mod agent;
pub mod conversation;
pub mod provider;
