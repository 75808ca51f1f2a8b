//! Error types for the relay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the registration endpoint.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid phone number format: {0}")]
    InvalidPhoneNumber(String),

    #[error("Verification provider error: {0}")]
    Provider(String),

    #[error("Verification provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            RelayError::InvalidPhoneNumber(_) => (StatusCode::BAD_REQUEST, "INVALID_PHONE_NUMBER"),
            RelayError::Provider(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            RelayError::ProviderUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_UNAVAILABLE")
            }
            RelayError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<twilio_client::TwilioError> for RelayError {
    fn from(e: twilio_client::TwilioError) -> Self {
        use twilio_client::TwilioError;
        match e {
            TwilioError::Http(ref inner) if inner.is_connect() || inner.is_timeout() => {
                RelayError::ProviderUnavailable(e.to_string())
            }
            TwilioError::RateLimit => RelayError::ProviderUnavailable(e.to_string()),
            other => RelayError::Provider(other.to_string()),
        }
    }
}
