//! Persona listing handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use chatbridge_infra::persona::PersonaSummary;

use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PersonaList {
    pub personas: Vec<PersonaSummary>,
}

/// GET /api/personas - List personas loaded from `roles.json`.
pub async fn list_personas(State(state): State<AppState>) -> Json<ApiResponse<PersonaList>> {
    let start = Instant::now();
    let personas = state.personas.summaries();
    Json(ApiResponse::timed(PersonaList { personas }, start))
}
