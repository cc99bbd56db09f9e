//! Axum router configuration with middleware.
//!
//! JSON routes live under `/api/`, observer streams under `/ws/`.
//! Middleware: permissive CORS and request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Catalog
        .route("/providers", get(handlers::provider::list_providers))
        .route(
            "/provider-status",
            get(handlers::provider::get_provider_status)
                .post(handlers::provider::post_provider_status),
        )
        .route("/personas", get(handlers::persona::list_personas))
        // Conversations
        .route(
            "/conversations",
            post(handlers::conversation::create_conversation),
        )
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation),
        )
        .route(
            "/conversations/{id}/transcript",
            get(handlers::conversation::get_transcript),
        );

    Router::new()
        .nest("/api", api_routes)
        .route(
            "/ws/conversations/{id}",
            get(handlers::ws::ws_conversation),
        )
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness probe.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "message": "Chat Bridge API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
