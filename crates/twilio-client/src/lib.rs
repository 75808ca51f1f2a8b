//! Twilio REST API client for outgoing caller id validation.

mod client;
mod error;
mod types;

pub use client::{TwilioClient, DEFAULT_BASE_URL};
pub use error::TwilioError;
pub use types::*;
