//! Graceful disconnect
//!
//! On interrupt the client asks the engine to end the stream with a
//! normal-closure close frame, then waits a bounded time for the receive
//! loop to see the acknowledgement. If the loop already finished there is
//! nothing to negotiate and no frame is sent.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use jc_core::traits::Outbound;

/// Send a close frame and wait up to `timeout` for `done` to finish.
///
/// Never fails: a send error is logged and the wait still runs, and an
/// unanswered close ends in the caller releasing the connection anyway.
pub async fn negotiate<O, T>(outbound: &mut O, done: &mut JoinHandle<T>, timeout: Duration)
where
    O: Outbound + ?Sized,
{
    if done.is_finished() {
        debug!("Receive loop already finished, skipping close handshake");
        return;
    }

    if let Err(e) = outbound.send_close("").await {
        warn!(error = %e, "Failed to send close frame");
    }

    match tokio::time::timeout(timeout, &mut *done).await {
        Ok(_) => debug!("Close handshake acknowledged"),
        Err(_) => debug!(?timeout, "Close handshake timed out"),
    }
}
