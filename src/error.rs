//! Error types for the gateway.
//!
//! Everything the generate handler can fail with ends up as a [`GatewayError`],
//! which renders itself as a JSON `{ "error": ... }` body.

use axum::Json;
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Failure talking to the generation provider.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Provider answered with a non-success status. `body` is kept verbatim
    /// since it carries the provider's error codes.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected provider response: {0}")]
    Decode(String),

    #[error("provider did not answer within {0} seconds")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

/// User facing category of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    InvalidCredential,
    QuotaExceeded,
    PermissionDenied,
    Generic,
}

impl UpstreamError {
    pub fn classify(&self) -> UpstreamFailure {
        let message = self.to_string();
        if message.contains("API_KEY_INVALID") {
            UpstreamFailure::InvalidCredential
        } else if message.contains("QUOTA_EXCEEDED") {
            UpstreamFailure::QuotaExceeded
        } else if message.contains("PERMISSION_DENIED") {
            UpstreamFailure::PermissionDenied
        } else {
            UpstreamFailure::Generic
        }
    }
}

impl UpstreamFailure {
    // `key_env` names the variable the operator should fix
    pub fn message(self, key_env: &str) -> String {
        match self {
            UpstreamFailure::InvalidCredential => {
                format!("Invalid API key. Please check your {key_env}.")
            }
            UpstreamFailure::QuotaExceeded => {
                "API quota exceeded. Please try again later.".to_string()
            }
            UpstreamFailure::PermissionDenied => {
                "Permission denied. Please check API key permissions.".to_string()
            }
            UpstreamFailure::Generic => "Failed to generate content".to_string(),
        }
    }
}

/// Errors returned by the request gate.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Admission denied; the caller may retry after `reset_in` seconds
    #[error("Rate limit exceeded. Try again in {reset_in} seconds.")]
    Throttled { reset_in: u64 },

    /// Provider credential missing, needs operator action
    #[error("{provider} API key not configured")]
    MissingApiKey { provider: &'static str },

    #[error("{0}")]
    BadRequest(String),

    /// Provider failure, already mapped to a user facing message
    #[error("{message}")]
    Upstream { message: String },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::MissingApiKey { .. } | GatewayError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn upstream(err: &UpstreamError, key_env: &str) -> Self {
        GatewayError::Upstream {
            message: err.classify().message(key_env),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        match self {
            GatewayError::Throttled { reset_in } => (
                status,
                [
                    (RATE_LIMIT_REMAINING, "0".to_string()),
                    (RATE_LIMIT_RESET, reset_in.to_string()),
                ],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
