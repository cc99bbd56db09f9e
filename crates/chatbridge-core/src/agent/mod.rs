//! The reply-generation capability shared by every provider adapter.
//!
//! - `ChatAgent`: RPITIT trait for concrete adapters
//! - `BoxChatAgent`: object-safe wrapper for dynamic dispatch
//! - `context`: trailing-window context construction

pub mod box_agent;
pub mod chat_agent;
pub mod context;
