//! Gateway client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Call not found: {0}")]
    CallNotFound(String),

    #[error("Account registration failed: {0}")]
    RegistrationFailed(String),
}
