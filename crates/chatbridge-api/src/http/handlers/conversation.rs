//! Conversation handlers: create, inspect, and export transcripts.
//!
//! Creating a conversation builds both agents up front; streaming starts
//! only when an observer attaches at `/ws/conversations/{id}`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use chatbridge_core::conversation::orchestrator::{ConversationRequest, SideRequest};
use chatbridge_core::conversation::state::{Conversation, ConversationSnapshot};
use chatbridge_core::conversation::transcript::{render_markdown, transcript_filename};
use chatbridge_core::provider::credential::{LayeredSource, StaticSource};
use chatbridge_types::conversation::{ConversationId, ConversationSettings, ConversationStatus};
use chatbridge_types::error::ConversationError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body of `POST /api/conversations`.
#[derive(Debug, Deserialize)]
pub struct CreateConversationBody {
    pub provider_a: String,
    pub provider_b: String,
    #[serde(default)]
    pub persona_a: Option<String>,
    #[serde(default)]
    pub persona_b: Option<String>,
    #[serde(default)]
    pub model_a: Option<String>,
    #[serde(default)]
    pub model_b: Option<String>,
    #[serde(default)]
    pub system_a: Option<String>,
    #[serde(default)]
    pub system_b: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature_a: f64,
    #[serde(default = "default_temperature")]
    pub temperature_b: f64,
    pub starter_message: String,
    /// Falls back to `[conversation] default_max_rounds`.
    #[serde(default)]
    pub max_rounds: Option<u32>,
    /// Falls back to `[conversation] default_memory_window`.
    #[serde(default)]
    pub mem_rounds: Option<usize>,
    /// Provider id -> API key, used for this conversation only.
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

fn default_temperature() -> f64 {
    0.7
}

#[derive(Debug, Serialize)]
pub struct ConversationCreated {
    pub conversation_id: ConversationId,
    pub status: ConversationStatus,
    pub starter_message: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptExport {
    pub transcript: String,
    pub filename: String,
    pub conversation_id: ConversationId,
    pub message_count: usize,
}

/// POST /api/conversations - Resolve both sides and register a conversation.
pub async fn create_conversation(
    State(state): State<AppState>,
    Json(body): Json<CreateConversationBody>,
) -> Result<Json<ApiResponse<ConversationCreated>>, AppError> {
    let start = Instant::now();

    if body.starter_message.trim().is_empty() {
        return Err(AppError::Validation("starter_message must not be empty".to_string()));
    }

    let defaults = &state.config.conversation;
    let agent_a = state.personas.resolve_side(
        body.persona_a.as_deref(),
        SideRequest {
            provider: body.provider_a,
            model: body.model_a,
            temperature: body.temperature_a,
            system_prompt: body.system_a,
            persona: None,
        },
    );
    let agent_b = state.personas.resolve_side(
        body.persona_b.as_deref(),
        SideRequest {
            provider: body.provider_b,
            model: body.model_b,
            temperature: body.temperature_b,
            system_prompt: body.system_b,
            persona: None,
        },
    );
    let request = ConversationRequest {
        agent_a,
        agent_b,
        starter_message: body.starter_message,
        settings: ConversationSettings {
            max_rounds: body.max_rounds.unwrap_or(defaults.default_max_rounds),
            memory_window: body.mem_rounds.unwrap_or(defaults.default_memory_window),
        },
    };

    let overrides = StaticSource::from_api_keys(state.registry(), &body.api_keys);
    let credentials = LayeredSource::new(&overrides, state.env.as_ref());
    let conversation =
        state
            .orchestrator
            .create_conversation(request, state.factory.as_ref(), &credentials)?;

    let id = conversation.id();
    let created = ConversationCreated {
        conversation_id: id,
        status: conversation.status().await,
        starter_message: conversation.starter_message().to_string(),
    };
    let resp = ApiResponse::timed(created, start)
        .with_link("self", &format!("/api/conversations/{id}"))
        .with_link("stream", &format!("/ws/conversations/{id}"))
        .with_link("transcript", &format!("/api/conversations/{id}/transcript"));

    Ok(Json(resp))
}

/// GET /api/conversations/{id} - Current status, settings, and messages.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ConversationSnapshot>>, AppError> {
    let start = Instant::now();
    let snapshot = lookup(&state, &id)?.snapshot().await;
    Ok(Json(ApiResponse::timed(snapshot, start)))
}

/// GET /api/conversations/{id}/transcript - Markdown export.
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TranscriptExport>>, AppError> {
    let start = Instant::now();
    let snapshot = lookup(&state, &id)?.snapshot().await;

    let export = TranscriptExport {
        transcript: render_markdown(&snapshot),
        filename: transcript_filename(&snapshot, chrono::Utc::now()),
        conversation_id: snapshot.id,
        message_count: snapshot.messages.len(),
    };
    Ok(Json(ApiResponse::timed(export, start)))
}

/// Malformed ids are indistinguishable from unknown ones.
pub(crate) fn parse_id(raw: &str) -> Result<ConversationId, ConversationError> {
    raw.parse().map_err(|_| ConversationError::NotFound)
}

fn lookup(state: &AppState, raw: &str) -> Result<Arc<Conversation>, AppError> {
    let id = parse_id(raw)?;
    state
        .orchestrator
        .store()
        .get(&id)
        .ok_or(AppError::Conversation(ConversationError::NotFound))
}
