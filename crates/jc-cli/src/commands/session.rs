//! Streaming session wiring shared by `container start` and `image build`

use std::future::Future;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use jc_core::error::ActionError;
use jc_core::JcError;
use jc_session::{SessionCoordinator, TerminationReason, WsDialer};

use super::EngineContext;
use crate::signal::spawn_interrupt_watcher;

/// Stream `endpoint` to stdout while `action` makes the engine produce output.
///
/// Succeeds when the engine ends the stream cleanly or the user interrupts.
pub async fn stream<A, T>(ctx: &EngineContext, endpoint: &str, action: A) -> Result<()>
where
    A: Future<Output = Result<T, ActionError>>,
{
    let interrupt = CancellationToken::new();
    let watcher = spawn_interrupt_watcher(interrupt.clone());

    let coordinator =
        SessionCoordinator::new(WsDialer::new(), interrupt.clone()).with_config(&ctx.session);
    let result = coordinator
        .run(endpoint, action, std::io::stdout())
        .await
        .map_err(JcError::from);

    // Ends the watcher if Ctrl-C never came
    interrupt.cancel();
    let _ = watcher.await;

    let report = result.with_context(|| format!("Failed to open session at {}", endpoint))?;
    debug!(reason = %report.reason, "Session report");

    match report.reason {
        TerminationReason::Ok | TerminationReason::UserInterrupted => Ok(()),
        reason => anyhow::bail!("session ended: {}", reason),
    }
}
