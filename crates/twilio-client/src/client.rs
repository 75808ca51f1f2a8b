//! Twilio REST API HTTP client.

use crate::error::TwilioError;
use crate::types::*;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Default Twilio API host.
pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// REST API version prefix.
const API_VERSION: &str = "2010-04-01";

/// Twilio REST API client.
///
/// The auth token is stored using `SecretString` to prevent accidental
/// exposure in logs or debug output.
#[derive(Clone)]
pub struct TwilioClient {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: SecretString,
}

impl TwilioClient {
    /// Create a new Twilio client.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TwilioError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_sid: account_sid.into(),
            auth_token: SecretString::new(auth_token.into()),
        })
    }

    fn account_url(&self, resource: &str) -> String {
        format!(
            "{}/{}/Accounts/{}{}",
            self.base_url,
            API_VERSION,
            encode(&self.account_sid),
            resource
        )
    }

    /// Start validating a phone number as an outgoing caller id.
    ///
    /// Twilio answers synchronously with the code it will expect and the
    /// SID of the call it is about to place to the number.
    #[instrument(skip(self, request), fields(phone_number = %request.phone_number))]
    pub async fn create_validation_request(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, TwilioError> {
        let response = self
            .client
            .post(self.account_url("/OutgoingCallerIds.json"))
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(request)
            .send()
            .await?;

        let validation: ValidationResponse = self.handle_response(response).await?;
        debug!(call_sid = %validation.call_sid, "Validation request created");
        Ok(validation)
    }

    /// Fetch the account resource.
    #[instrument(skip(self))]
    pub async fn get_account(&self) -> Result<Account, TwilioError> {
        let response = self
            .client
            .get(self.account_url(".json"))
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Health check - returns true if the credentials are accepted.
    pub async fn health_check(&self) -> bool {
        self.get_account().await.is_ok()
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, TwilioError> {
        if response.status().is_success() {
            let body = response.text().await?;
            debug!("Response body: {}", body.chars().take(200).collect::<String>());
            serde_json::from_str(&body).map_err(TwilioError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from failed response.
    async fn extract_error(&self, response: reqwest::Response) -> TwilioError {
        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                TwilioError::RateLimit
            }
            StatusCode::UNAUTHORIZED => {
                warn!("Authentication failed");
                TwilioError::Unauthorized
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "Twilio request failed");
                match serde_json::from_str::<ApiErrorBody>(&body) {
                    Ok(err) => TwilioError::Api {
                        status: status.as_u16(),
                        code: err.code,
                        message: err.message,
                    },
                    Err(_) => TwilioError::Api {
                        status: status.as_u16(),
                        code: None,
                        message: if body.is_empty() {
                            "Unknown error".into()
                        } else {
                            body
                        },
                    },
                }
            }
        }
    }
}
