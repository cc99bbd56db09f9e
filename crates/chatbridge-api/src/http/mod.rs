//! HTTP/REST and WebSocket layer for Chat Bridge.
//!
//! Axum-based JSON API under `/api/`, WebSocket observer streams under
//! `/ws/`, envelope response format and permissive CORS.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
