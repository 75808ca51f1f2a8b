//! Request and response types for the Twilio REST API.

use serde::{Deserialize, Serialize};

/// Form body for `POST /Accounts/{sid}/OutgoingCallerIds.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRequest {
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    #[serde(rename = "FriendlyName", skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
}

impl ValidationRequest {
    /// Create a validation request for a phone number.
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            friendly_name: None,
        }
    }

    pub fn with_friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }
}

/// A pending outgoing caller id validation.
///
/// Twilio places a call to `phone_number` identified by `call_sid`; the
/// callee must key in `validation_code` to prove ownership.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ValidationResponse {
    pub account_sid: String,
    pub call_sid: String,
    pub friendly_name: Option<String>,
    pub phone_number: String,
    #[serde(deserialize_with = "string_or_number")]
    pub validation_code: String,
}

/// Twilio has documented `validation_code` both as a string and a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(u64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(s) => s,
        Code::Number(n) => n.to_string(),
    })
}

/// Error body returned by the Twilio REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<u32>,
    pub message: String,
    #[serde(default)]
    pub more_info: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Account resource, used for health checks.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub sid: String,
    pub friendly_name: Option<String>,
    pub status: String,
}
