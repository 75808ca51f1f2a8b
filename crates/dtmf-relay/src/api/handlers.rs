//! HTTP request handlers.

use super::types::{HealthResponse, StartVerificationRequest};
use super::AppState;
use crate::error::RelayError;
use crate::registry::{normalize_phone_number, VerificationRecord};
use axum::{extract::State, Json};
use tracing::{info, warn};

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_healthy = state.provider.health_check().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        pending_verifications: state.registry.len().await,
        provider_healthy,
    })
}

/// Ask the provider to verify a number and remember the code it issued.
///
/// Responds with the provider's friendly name for the number. Nothing is
/// stored unless the provider call succeeds.
pub async fn start_verification(
    State(state): State<AppState>,
    Json(request): Json<StartVerificationRequest>,
) -> Result<Json<String>, RelayError> {
    let number =
        normalize_phone_number(&request.phone_number).map_err(RelayError::InvalidPhoneNumber)?;
    info!(phone_number = %number, "Verification request received");

    let started = state
        .provider
        .start_verification(&number, request.friendly_name())
        .await
        .map_err(|e| {
            warn!(phone_number = %number, "Provider rejected verification: {}", e);
            e
        })?;

    state
        .registry
        .put(
            started.session_id.clone(),
            VerificationRecord::new(number.clone(), started.verification_code),
        )
        .await;

    info!(
        phone_number = %number,
        session_id = %started.session_id,
        "Verification pending, awaiting provider call"
    );

    Ok(Json(started.friendly_name))
}
