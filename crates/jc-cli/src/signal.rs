//! Ctrl-C handling for streaming sessions

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Forward the first Ctrl-C into `token`.
///
/// Later presses are swallowed: once the handler is installed the process
/// no longer dies on SIGINT, and the session's close timeout bounds the
/// wait instead. The watcher exits when the token is cancelled by anyone.
pub fn spawn_interrupt_watcher(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    println!("Interrupted by user");
                    token.cancel();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            },
            _ = token.cancelled() => {}
        }
    })
}
