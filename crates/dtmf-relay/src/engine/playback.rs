//! Per-call answer, play, hang up flow.

use super::call::CallHandle;
use super::pacer::{Pacer, TokioPacer};
use crate::registry::Registry;
use crate::tones::ToneSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Silence between consecutive tones so the far end's DTMF receiver can
/// tell repeated digits apart.
pub const INTER_DIGIT_INTERVAL: Duration = Duration::from_millis(500);

/// How a call's flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The stack refused to answer; nothing else was attempted.
    AnswerFailed,
    /// No verification was pending for the call's session.
    NoPendingVerification { hung_up: bool },
    /// The verification code was played.
    Played(PlaybackReport),
}

/// Per-digit results of a playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Digits whose tone reached the call.
    pub sent: Vec<char>,
    /// Digits with no usable tone asset.
    pub missing_tones: Vec<char>,
    /// Digits whose audio write failed.
    pub failed_writes: Vec<char>,
    pub hung_up: bool,
}

impl PlaybackReport {
    pub fn is_complete(&self) -> bool {
        self.missing_tones.is_empty() && self.failed_writes.is_empty()
    }
}

/// Correlates inbound calls with pending verifications and keys in the code.
#[derive(Clone)]
pub struct PlaybackEngine {
    registry: Registry,
    tones: Arc<dyn ToneSource>,
    pacer: Arc<dyn Pacer>,
}

impl PlaybackEngine {
    /// Create an engine that paces digits on the wall clock.
    pub fn new(registry: Registry, tones: Arc<dyn ToneSource>) -> Self {
        Self {
            registry,
            tones,
            pacer: Arc::new(TokioPacer),
        }
    }

    /// Replace the pacer.
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Run one call from arrival to termination.
    ///
    /// Never fails: every error is logged and folded into the outcome.
    #[instrument(skip_all, fields(session_id = %call.session_id()))]
    pub async fn handle_call<C: CallHandle>(&self, mut call: C) -> CallOutcome {
        if let Err(e) = call.answer().await {
            error!("Failed to answer call: {}", e);
            return CallOutcome::AnswerFailed;
        }
        debug!("Call answered");

        let session_id = call.session_id().to_string();
        let Some(record) = self.registry.take(&session_id).await else {
            info!("No pending verification for call");
            let hung_up = hang_up(&mut call).await;
            return CallOutcome::NoPendingVerification { hung_up };
        };

        info!(phone_number = %record.phone_number, "Playing verification code");
        let mut report = self.play(&mut call, &record.verification_code).await;
        report.hung_up = hang_up(&mut call).await;

        if report.is_complete() {
            info!(digits = report.sent.len(), "Verification code delivered");
        } else {
            warn!(
                sent = report.sent.len(),
                missing_tones = ?report.missing_tones,
                failed_writes = ?report.failed_writes,
                "Verification code delivered partially"
            );
        }

        CallOutcome::Played(report)
    }

    async fn play<C: CallHandle>(&self, call: &mut C, code: &str) -> PlaybackReport {
        let mut report = PlaybackReport::default();

        for digit in code.chars() {
            match self.tones.tone(digit).await {
                Ok(payload) => match call.write_audio(payload).await {
                    Ok(()) => {
                        debug!(%digit, "Tone sent");
                        report.sent.push(digit);
                    }
                    Err(e) => {
                        warn!(%digit, "Failed to send tone: {}", e);
                        report.failed_writes.push(digit);
                    }
                },
                Err(e) => {
                    error!(%digit, "Skipping digit: {}", e);
                    report.missing_tones.push(digit);
                }
            }

            // Also after the last digit, so its tone finishes before hangup.
            self.pacer.pause(INTER_DIGIT_INTERVAL).await;
        }

        report
    }
}

async fn hang_up<C: CallHandle>(call: &mut C) -> bool {
    match call.hangup().await {
        Ok(()) => {
            debug!("Call hung up");
            true
        }
        Err(e) => {
            warn!("Failed to hang up call: {}", e);
            false
        }
    }
}
