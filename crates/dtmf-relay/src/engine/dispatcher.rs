//! One task per inbound call.

use super::call::CallHandle;
use super::playback::{CallOutcome, PlaybackEngine};
use futures::{Stream, StreamExt};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};

/// Hands each arriving call to its own task so a slow playback never holds
/// up calls behind it.
#[derive(Clone)]
pub struct CallDispatcher {
    engine: PlaybackEngine,
}

impl CallDispatcher {
    pub fn new(engine: PlaybackEngine) -> Self {
        Self { engine }
    }

    /// Spawn the flow for a single call.
    pub fn dispatch<C>(&self, call: C) -> JoinHandle<CallOutcome>
    where
        C: CallHandle + 'static,
    {
        let engine = self.engine.clone();
        tokio::spawn(async move { engine.handle_call(call).await })
    }

    /// Drive calls from `calls` until the stream ends, then wait for the
    /// calls still in flight.
    ///
    /// A call task that panics is logged and does not affect the others.
    pub async fn run<S, C>(&self, calls: S)
    where
        S: Stream<Item = C>,
        C: CallHandle + 'static,
    {
        let mut calls = std::pin::pin!(calls);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                next = calls.next() => match next {
                    Some(call) => {
                        let engine = self.engine.clone();
                        in_flight.spawn(async move { engine.handle_call(call).await });
                    }
                    None => break,
                },
                Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                    log_finished(finished);
                }
            }
        }

        info!("Call source closed, waiting for {} calls in flight", in_flight.len());
        while let Some(finished) = in_flight.join_next().await {
            log_finished(finished);
        }
    }
}

fn log_finished(result: Result<CallOutcome, tokio::task::JoinError>) {
    match result {
        Ok(outcome) => debug!(?outcome, "Call finished"),
        Err(e) if e.is_panic() => error!("Call task panicked: {}", e),
        Err(e) => error!("Call task failed: {}", e),
    }
}
