//! Control API client for an external SIP/RTP gateway.
//!
//! The gateway owns SIP registration, dialogs and RTP; this crate only
//! drives it: register an account, poll for inbound calls, and answer,
//! feed audio to or hang up a call by id.

mod client;
mod error;
mod receiver;
mod types;

pub use client::GatewayClient;
pub use error::GatewayError;
pub use receiver::CallReceiver;
pub use types::*;
