//! Shared domain types for Chat Bridge.
//!
//! This crate contains the core domain types used across the bridge:
//! provider metadata, agent configuration, conversation messages and events,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod provider;
