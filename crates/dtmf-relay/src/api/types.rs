//! API request and response types.

use serde::{Deserialize, Serialize};

/// Friendly name used when the caller does not pick one.
pub const DEFAULT_FRIENDLY_NAME: &str = "Third Party VOIP Number";

/// Request to start verifying a phone number.
#[derive(Debug, Deserialize)]
pub struct StartVerificationRequest {
    /// The number to verify
    pub phone_number: String,

    /// Label the provider stores with the verified number
    pub friendly_name: Option<String>,
}

impl StartVerificationRequest {
    pub fn friendly_name(&self) -> &str {
        self.friendly_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_FRIENDLY_NAME)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub pending_verifications: usize,
    pub provider_healthy: bool,
}
