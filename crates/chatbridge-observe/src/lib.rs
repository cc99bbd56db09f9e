//! Observability for Chat Bridge: tracing subscriber and optional
//! OpenTelemetry export.

pub mod tracing_setup;
