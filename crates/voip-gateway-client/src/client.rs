//! Gateway HTTP client.

use crate::error::GatewayError;
use crate::types::*;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Control API client for the SIP/RTP gateway.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a new gateway client.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Check if the gateway is healthy.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Register the SIP user agent the gateway should run.
    #[instrument(skip(self, account), fields(username = %account.username, server = %account.server))]
    pub async fn register_account(&self, account: &SipAccount) -> Result<AccountStatus, GatewayError> {
        let response = self
            .client
            .post(format!("{}/v1/accounts", self.base_url))
            .json(account)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "SIP account registration failed");
            return Err(GatewayError::RegistrationFailed(format!("{} - {}", status, body)));
        }

        let status: AccountStatus = response.json().await?;
        debug!(registered = status.registered, "SIP account registered");
        Ok(status)
    }

    /// Fetch calls that arrived since the last poll.
    #[instrument(skip(self))]
    pub async fn incoming_calls(&self) -> Result<Vec<IncomingCall>, GatewayError> {
        let response = self
            .client
            .get(format!("{}/v1/calls/incoming", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(msg));
        }

        let calls: Vec<IncomingCall> = response.json().await?;
        if !calls.is_empty() {
            debug!("Received {} incoming calls", calls.len());
        }
        Ok(calls)
    }

    /// Answer a ringing call.
    #[instrument(skip(self))]
    pub async fn answer(&self, call_id: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.call_url(call_id, "answer"))
            .send()
            .await?;

        self.check_call_response(call_id, response).await
    }

    /// Queue raw audio on the call's outbound media stream.
    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    pub async fn send_audio(&self, call_id: &str, audio: Bytes) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.call_url(call_id, "audio"))
            .header("Content-Type", "application/octet-stream")
            .body(audio)
            .send()
            .await?;

        self.check_call_response(call_id, response).await
    }

    /// Hang up a call.
    #[instrument(skip(self))]
    pub async fn hangup(&self, call_id: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.call_url(call_id, "hangup"))
            .send()
            .await?;

        self.check_call_response(call_id, response).await
    }

    fn call_url(&self, call_id: &str, action: &str) -> String {
        format!("{}/v1/calls/{}/{}", self.base_url, encode(call_id), action)
    }

    async fn check_call_response(
        &self,
        call_id: &str,
        response: reqwest::Response,
    ) -> Result<(), GatewayError> {
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                Err(GatewayError::CallNotFound(call_id.to_string()))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "Call control request failed");
                Err(GatewayError::Api(format!("{} - {}", status, body)))
            }
        }
    }
}
