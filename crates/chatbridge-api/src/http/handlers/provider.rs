//! Provider catalog and credential status handlers.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use chatbridge_core::provider::credential::{LayeredSource, StaticSource, provider_status};
use chatbridge_types::provider::ProviderStatus;

use crate::http::response::ApiResponse;
use crate::state::AppState;

/// One catalog entry as listed by `GET /api/providers`.
#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub default_model: &'static str,
    pub needs_credential: bool,
}

#[derive(Debug, Serialize)]
pub struct ProviderList {
    pub providers: Vec<ProviderSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProviderStatusMap {
    pub providers: BTreeMap<&'static str, ProviderStatus>,
}

/// Optional body for `POST /api/provider-status`.
#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

/// GET /api/providers - List the provider catalog in stable order.
pub async fn list_providers(State(state): State<AppState>) -> Json<ApiResponse<ProviderList>> {
    let start = Instant::now();
    let providers = state
        .registry()
        .specs()
        .iter()
        .map(|spec| ProviderSummary {
            key: spec.id.as_str(),
            label: spec.label,
            description: spec.description,
            default_model: spec.default_model,
            needs_credential: spec.needs_credential,
        })
        .collect();

    Json(ApiResponse::timed(ProviderList { providers }, start).with_link("status", "/api/provider-status"))
}

/// GET /api/provider-status - Credential status from the server environment.
pub async fn get_provider_status(State(state): State<AppState>) -> Json<ApiResponse<ProviderStatusMap>> {
    status_with_keys(&state, &HashMap::new())
}

/// POST /api/provider-status - Credential status with caller-supplied keys
/// layered over the server environment.
pub async fn post_provider_status(
    State(state): State<AppState>,
    Json(body): Json<StatusRequest>,
) -> Json<ApiResponse<ProviderStatusMap>> {
    status_with_keys(&state, &body.api_keys)
}

fn status_with_keys(
    state: &AppState,
    api_keys: &HashMap<String, String>,
) -> Json<ApiResponse<ProviderStatusMap>> {
    let start = Instant::now();
    let overrides = StaticSource::from_api_keys(state.registry(), api_keys);
    let source = LayeredSource::new(&overrides, state.env.as_ref());

    let providers = state
        .registry()
        .specs()
        .iter()
        .map(|spec| (spec.id.as_str(), provider_status(spec, &source)))
        .collect();

    Json(ApiResponse::timed(ProviderStatusMap { providers }, start))
}
