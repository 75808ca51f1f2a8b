//! Gateway control API types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SIP user agent settings handed to the gateway once at startup.
#[derive(Clone, Serialize)]
pub struct SipAccount {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub local_ip: Option<String>,
    pub rtp_port_low: u16,
    pub rtp_port_high: u16,
}

impl fmt::Debug for SipAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SipAccount")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("local_ip", &self.local_ip)
            .field("rtp_port_low", &self.rtp_port_low)
            .field("rtp_port_high", &self.rtp_port_high)
            .finish()
    }
}

/// Account registration state reported by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountStatus {
    pub username: String,
    pub registered: bool,
}

/// An inbound call the gateway has not yet handed out.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IncomingCall {
    /// Gateway-local handle used for call control.
    pub call_id: String,
    /// Session identifier carried by the SIP dialog.
    pub session_id: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}
