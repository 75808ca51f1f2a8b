//! Binds the engine's call handle to the SIP/RTP gateway.

use crate::config::VoipConfig;
use crate::engine::{CallError, CallHandle};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use secrecy::ExposeSecret;
use voip_gateway_client::{CallReceiver, GatewayClient, GatewayError, IncomingCall, SipAccount};

impl From<GatewayError> for CallError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::CallNotFound(call_id) => CallError::Gone(call_id),
            other => CallError::Control(other.to_string()),
        }
    }
}

/// An inbound call controlled through the gateway.
pub struct GatewayCall {
    client: GatewayClient,
    call: IncomingCall,
}

impl GatewayCall {
    pub fn new(client: GatewayClient, call: IncomingCall) -> Self {
        Self { client, call }
    }

    pub fn call_id(&self) -> &str {
        &self.call.call_id
    }
}

#[async_trait]
impl CallHandle for GatewayCall {
    fn session_id(&self) -> &str {
        &self.call.session_id
    }

    async fn answer(&mut self) -> Result<(), CallError> {
        Ok(self.client.answer(&self.call.call_id).await?)
    }

    async fn write_audio(&mut self, audio: Bytes) -> Result<(), CallError> {
        Ok(self.client.send_audio(&self.call.call_id, audio).await?)
    }

    async fn hangup(&mut self) -> Result<(), CallError> {
        Ok(self.client.hangup(&self.call.call_id).await?)
    }
}

/// Stream of gateway calls ready for the dispatcher.
pub fn incoming_calls(
    client: GatewayClient,
    config: &VoipConfig,
) -> impl Stream<Item = GatewayCall> {
    CallReceiver::new(client.clone(), config.poll_interval)
        .stream()
        .map(move |call| GatewayCall::new(client.clone(), call))
}

/// SIP account settings for the gateway, taken from configuration.
pub fn sip_account(config: &VoipConfig) -> SipAccount {
    SipAccount {
        server: config.server_ip.clone(),
        port: config.server_port,
        username: config.username.clone(),
        password: config
            .password
            .as_ref()
            .map(|p| p.expose_secret().clone())
            .unwrap_or_default(),
        local_ip: config.local_ip.clone(),
        rtp_port_low: config.rtp_port_low,
        rtp_port_high: config.rtp_port_high,
    }
}
