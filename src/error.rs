//! Error types for the proxy and the uniform error body every failure path returns.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Backend returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Translation error: {message}")]
    Translation { message: String },

    #[error("Route {method} {path} not found")]
    NotFound { method: String, path: String },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ProxyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: msg.into(),
        }
    }

    pub fn upstream(status: u16, msg: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: msg.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
        }
    }

    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation {
            message: msg.into(),
        }
    }

    pub fn not_found(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            method: method.into(),
            path: path.into(),
        }
    }

    /// HTTP status the caller sees for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::NotFound { .. } => 404,
            // Backend statuses outside the error range would turn a failure into a success.
            Self::Upstream { status, .. } if (400..=599).contains(status) => *status,
            Self::Upstream { .. } => 502,
            _ => 500,
        }
    }

    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request_error",
            Self::NotFound { .. } => "not_found_error",
            Self::Upstream { .. } => "upstream_error",
            Self::Config { .. } => "configuration_error",
            _ => "api_error",
        }
    }

    /// Message safe to return to the caller. Transport and decoding failures
    /// get a generic message; their detail only goes to the logs.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidRequest { message } | Self::Upstream { message, .. } => message.clone(),
            Self::NotFound { .. } => self.to_string(),
            Self::Config { .. } => "Proxy is not configured with backend credentials".to_string(),
            Self::Transport { .. } => "Failed to reach the backend service".to_string(),
            Self::Translation { .. } => {
                "Backend returned a response the proxy could not read".to_string()
            }
            Self::Toml(_) => "Internal proxy error".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Wire shape of every error response: `{"error": {"message", "type", "code"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: u16,
}

/// Build the error body. `code` doubles as the HTTP status of the response.
#[must_use]
pub fn make_error(message: impl Into<String>, error_type: impl Into<String>, code: u16) -> ErrorResponse {
    ErrorResponse {
        error: ErrorDetail {
            message: message.into(),
            error_type: error_type.into(),
            code,
        },
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.error.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        make_error(self.client_message(), self.error_type(), self.status_code()).into_response()
    }
}
