//! The call leg the engine drives.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Call-control failures reported by the VoIP stack.
#[derive(Debug, Error)]
pub enum CallError {
    /// The far end is gone; the leg no longer exists.
    #[error("Call no longer exists: {0}")]
    Gone(String),

    #[error("Call control failed: {0}")]
    Control(String),
}

/// An inbound call, owned exclusively by the task handling it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallHandle: Send {
    /// Session identifier the verification provider put on its call leg.
    fn session_id(&self) -> &str;

    async fn answer(&mut self) -> Result<(), CallError>;

    /// Queue audio on the call's outbound media path.
    async fn write_audio(&mut self, audio: Bytes) -> Result<(), CallError>;

    async fn hangup(&mut self) -> Result<(), CallError>;
}
