//! Incoming call receiver with polling.

use crate::client::GatewayClient;
use crate::types::IncomingCall;
use std::time::Duration;
use tokio::time::sleep;
use tokio_stream::Stream;
use tracing::{debug, error};

/// Delay before polling again after a failed poll.
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Call receiver that polls the gateway for new inbound calls.
pub struct CallReceiver {
    client: GatewayClient,
    poll_interval: Duration,
}

impl CallReceiver {
    /// Create a new call receiver.
    pub fn new(client: GatewayClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    /// Start receiving calls as an async stream.
    ///
    /// The stream never ends on its own; poll failures are logged and
    /// retried after a back-off.
    pub fn stream(self) -> impl Stream<Item = IncomingCall> {
        async_stream::stream! {
            loop {
                match self.client.incoming_calls().await {
                    Ok(calls) => {
                        for call in calls {
                            debug!(call_id = %call.call_id, session_id = %call.session_id, "Incoming call");
                            yield call;
                        }
                    }
                    Err(e) => {
                        error!("Receive error: {}", e);
                        sleep(ERROR_BACKOFF).await;
                        continue;
                    }
                }

                sleep(self.poll_interval).await;
            }
        }
    }
}
