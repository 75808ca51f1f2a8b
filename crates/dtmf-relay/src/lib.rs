//! DTMF Relay - keys provider verification codes into inbound calls.
//!
//! The relay sits between a caller-ID verification provider and a SIP
//! account:
//! - `POST /start-verification` asks the provider to verify a number and
//!   remembers the code it issued, keyed by the provider's call session
//! - When the provider's call arrives on the SIP account, the relay answers
//!   it, plays the code as DTMF tones and hangs up

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod provider;
pub mod registry;
pub mod tones;
pub mod voip;

pub use config::Config;
pub use engine::{CallDispatcher, CallHandle, CallOutcome, PlaybackEngine, PlaybackReport};
pub use error::RelayError;
pub use provider::{StartedVerification, VerificationProvider};
pub use registry::{Registry, VerificationRecord};
pub use tones::{FileToneSource, ToneSource};
