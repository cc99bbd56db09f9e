//! HTTP and WebSocket request handlers.

pub mod conversation;
pub mod persona;
pub mod provider;
pub mod ws;
