//! Verification provider seam used by the registration endpoint.

use crate::error::RelayError;
use async_trait::async_trait;
use twilio_client::{TwilioClient, ValidationRequest};

/// A verification the provider has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedVerification {
    /// Identifier of the provider's call leg, later seen as the inbound
    /// call's session id.
    pub session_id: String,
    pub verification_code: String,
    pub friendly_name: String,
}

/// Starts verifications with an external provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    async fn start_verification(
        &self,
        phone_number: &str,
        friendly_name: &str,
    ) -> Result<StartedVerification, RelayError>;

    async fn health_check(&self) -> bool;
}

#[async_trait]
impl VerificationProvider for TwilioClient {
    async fn start_verification(
        &self,
        phone_number: &str,
        friendly_name: &str,
    ) -> Result<StartedVerification, RelayError> {
        let request = ValidationRequest::new(phone_number).with_friendly_name(friendly_name);
        let response = self.create_validation_request(&request).await?;

        Ok(StartedVerification {
            session_id: response.call_sid,
            verification_code: response.validation_code,
            friendly_name: response
                .friendly_name
                .unwrap_or_else(|| friendly_name.to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        TwilioClient::health_check(self).await
    }
}
