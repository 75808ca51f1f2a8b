//! Pending verifications keyed by call session id.

mod memory;

pub use memory::Registry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A verification code waiting for the provider's call to arrive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationRecord {
    /// The phone number being verified, in E.164 format
    pub phone_number: String,

    /// Digits to key in once the call is up
    pub verification_code: String,

    /// When the provider issued the code
    pub created_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Create a record stamped with the current time.
    pub fn new(phone_number: impl Into<String>, verification_code: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            verification_code: verification_code.into(),
            created_at: Utc::now(),
        }
    }

    /// Time elapsed since the record was created.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.created_at).to_std().unwrap_or_default()
    }

    /// Whether the record has outlived `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}

/// Normalize a phone number to E.164 format.
///
/// The number must carry its country code behind a leading `+`. Spaces,
/// dashes, dots and parentheses are stripped; no country code is ever
/// inferred.
pub fn normalize_phone_number(number: &str) -> Result<String, String> {
    let Some(rest) = number.trim().strip_prefix('+') else {
        return Err("Phone number must start with + and a country code".into());
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            other => return Err(format!("Unexpected character {:?} in phone number", other)),
        }
    }

    if digits.is_empty() {
        return Err("Phone number must contain at least one digit".into());
    }

    if digits.len() < 7 {
        return Err("Phone number too short".into());
    }

    if digits.len() > 15 {
        return Err("Phone number too long".into());
    }

    if digits.starts_with('0') {
        return Err("Country code cannot start with 0".into());
    }

    Ok(format!("+{}", digits))
}
