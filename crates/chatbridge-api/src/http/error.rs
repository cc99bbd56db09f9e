//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use chatbridge_types::error::{BridgeError, ConversationError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Provider resolution or agent construction failed.
    Bridge(BridgeError),
    /// Conversation lookup failed.
    Conversation(ConversationError),
    /// Request body failed validation.
    Validation(String),
}

impl From<BridgeError> for AppError {
    fn from(e: BridgeError) -> Self {
        AppError::Bridge(e)
    }
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        AppError::Conversation(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Bridge(e @ (BridgeError::UnknownProvider(_) | BridgeError::UnsupportedProvider(_))) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_PROVIDER", e.to_string())
            }
            AppError::Bridge(e @ (BridgeError::MissingCredential { .. } | BridgeError::MisconfiguredProvider { .. })) => {
                (StatusCode::BAD_REQUEST, "CREDENTIAL_ERROR", e.to_string())
            }
            AppError::Bridge(e) => {
                tracing::error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
            AppError::Conversation(ConversationError::NotFound) => (
                StatusCode::NOT_FOUND,
                "CONVERSATION_NOT_FOUND",
                ConversationError::NotFound.to_string(),
            ),
            AppError::Conversation(e) => (StatusCode::CONFLICT, "CONVERSATION_CONFLICT", e.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string(), 0);
        (status, Json(body)).into_response()
    }
}
