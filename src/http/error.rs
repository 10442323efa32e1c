use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Classified failure returned to endpoint wrappers.
///
/// By the time a caller sees one of these, any user-facing presentation
/// (toast, modal, navigation) has already happened inside the pipeline;
/// callers must not re-display the message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("failed to decode response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend error {code}: {msg}")]
    Backend { code: String, msg: String },
    #[error("session terminated by backend (code {code})")]
    Logout { code: String },
    #[error("session terminated pending acknowledgment (code {code}): {msg}")]
    ModalLogout { code: String, msg: String },
    #[error("access token expired and refresh failed")]
    AuthExpired,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Error taxonomy exposed to callers branching on failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure, timeout, or a response without a parseable envelope.
    Transport,
    /// Parseable envelope with an unrecognized failure code.
    Backend,
    /// Terminal forced logout.
    Logout,
    /// Terminal logout behind user acknowledgment.
    ModalLogout,
    /// Token expired and could not be refreshed.
    AuthExpired,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Backend { .. } => ErrorKind::Backend,
            ApiError::Logout { .. } => ErrorKind::Logout,
            ApiError::ModalLogout { .. } => ErrorKind::ModalLogout,
            ApiError::AuthExpired => ErrorKind::AuthExpired,
            ApiError::Transport(_)
            | ApiError::HttpStatus { .. }
            | ApiError::Decode(_)
            | ApiError::Config(_)
            | ApiError::InvalidRequest(_)
            | ApiError::Url(_) => ErrorKind::Transport,
        }
    }

    /// Backend business code carried by the error, when there is one.
    pub fn backend_code(&self) -> Option<&str> {
        match self {
            ApiError::Backend { code, .. }
            | ApiError::Logout { code }
            | ApiError::ModalLogout { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Message suitable for user-facing surfacing.
    pub fn surface_message(&self) -> String {
        match self {
            ApiError::Backend { msg, .. } | ApiError::ModalLogout { msg, .. } => msg.clone(),
            other => other.to_string(),
        }
    }
}
