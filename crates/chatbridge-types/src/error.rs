use thiserror::Error;

/// Category of a failed adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The backend answered with a non-2xx status.
    HttpStatus(u16),
    /// The backend answered but produced no usable text.
    EmptyResponse,
    /// The request never completed (connect, timeout, body read).
    Transport,
    /// The response body could not be parsed.
    Decode,
    /// A blocking worker panicked or was cancelled.
    Worker,
}

/// A runtime failure while generating one reply.
///
/// Fatal to the owning conversation only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::HttpStatus(status),
            message: message.into(),
        }
    }

    pub fn empty_response(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::EmptyResponse,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Decode,
            message: message.into(),
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Worker,
            message: message.into(),
        }
    }
}

/// Errors raised while resolving providers and building agents.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Unknown provider '{0}'.")]
    UnknownProvider(String),

    #[error("Unsupported provider '{0}'.")]
    UnsupportedProvider(String),

    #[error("Missing {label} credentials. Set {key}.")]
    MissingCredential { label: String, key: String },

    #[error("{label} requires credentials but no credential key is configured.")]
    MisconfiguredProvider { label: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Configuration or input faults that callers should surface as client errors.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BridgeError::UnknownProvider(_)
                | BridgeError::UnsupportedProvider(_)
                | BridgeError::MissingCredential { .. }
                | BridgeError::MisconfiguredProvider { .. }
        )
    }
}

/// Errors from conversation lookup and observer attachment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("Conversation not found")]
    NotFound,

    #[error("Conversation is inactive")]
    Inactive,

    #[error("Conversation is already streaming")]
    AlreadyStreaming,
}
