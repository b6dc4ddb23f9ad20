//! Error types for the lending client

use std::sync::Arc;

use thiserror::Error;

/// Failure raised by the transport before any HTTP status was received
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Could not connect: {0}")]
    Connect(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidRequest(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Main client error type
///
/// Cloneable so it can be carried inside observable view states.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Network failure: {0}")]
    NetworkFailure(#[from] TransportError),

    #[error("Decode failure: {0}")]
    DecodeFailure(#[source] Arc<serde_json::Error>),

    #[error("Server failure ({status_code}): {}", message.as_deref().unwrap_or("no details"))]
    ServerFailure {
        status_code: u16,
        message: Option<String>,
    },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::DecodeFailure(Arc::new(e))
    }
}

impl ApiError {
    /// Short human-readable message suitable for display.
    ///
    /// Status codes and causes stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::NetworkFailure(_) => "Network connection failed, please try again later.",
            ApiError::DecodeFailure(_) => "The server response could not be read.",
            ApiError::ServerFailure { status_code, .. } if *status_code == 401 || *status_code == 403 => {
                "Your session has expired, please log in again."
            }
            ApiError::ServerFailure { status_code, .. } if *status_code >= 500 => {
                "The server is unavailable, please try again later."
            }
            ApiError::ServerFailure { .. } => "The request was refused by the server.",
            ApiError::AuthRequired => "Please log in first.",
            ApiError::Unknown(_) => "An unknown error occurred.",
        }
    }

    /// HTTP status code when the server answered with a failure
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::ServerFailure { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type AppResult<T> = Result<T, ApiError>;
