//! Session coordinator
//!
//! Owns one streaming session from dial to release. The receive loop runs as
//! its own task; the coordinator fires the trigger action, then waits for
//! whichever comes first: the loop finishing or the interrupt token. The dial
//! and the trigger are raced against the interrupt token as well.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use jc_core::config::{SessionConfig, DEFAULT_CLOSE_TIMEOUT};
use jc_core::error::{ActionError, ConnectionError};
use jc_core::traits::{Connection, Dialer, Outbound};

use crate::negotiator::negotiate;
use crate::receiver::ReceiveLoop;
use crate::state::{SessionState, TerminationReason};

/// Outcome of a finished session
#[derive(Debug)]
pub struct SessionReport {
    /// Always [`SessionState::Closed`] once `run` returns
    pub state: SessionState,
    /// Why the session ended
    pub reason: TerminationReason,
    /// Error of the trigger action, if it failed
    pub action_error: Option<ActionError>,
}

/// Releases the outbound half exactly once and stops the receive task,
/// including when the session future is dropped mid-flight
struct ConnectionGuard {
    outbound: Option<Box<dyn Outbound>>,
    receiver: Option<AbortHandle>,
}

impl ConnectionGuard {
    fn new(outbound: Box<dyn Outbound>) -> Self {
        Self {
            outbound: Some(outbound),
            receiver: None,
        }
    }

    fn watch(&mut self, receiver: AbortHandle) {
        self.receiver = Some(receiver);
    }

    fn outbound(&mut self) -> Option<&mut (dyn Outbound + 'static)> {
        self.outbound.as_deref_mut()
    }

    async fn release(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            receiver.abort();
        }
        if let Some(mut outbound) = self.outbound.take() {
            outbound.close().await;
            debug!("Session connection released");
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            receiver.abort();
        }
        if self.outbound.take().is_some() {
            debug!("Session connection dropped before release");
        }
    }
}

/// Runs streaming sessions over connections opened by `D`
pub struct SessionCoordinator<D> {
    dialer: D,
    interrupt: CancellationToken,
    close_timeout: Duration,
}

impl<D: Dialer> SessionCoordinator<D> {
    /// Create a coordinator; cancelling `interrupt` ends any running session
    pub fn new(dialer: D, interrupt: CancellationToken) -> Self {
        Self {
            dialer,
            interrupt,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }

    /// Apply the `[session]` section of the config file
    pub fn with_config(mut self, config: &SessionConfig) -> Self {
        self.close_timeout = config.close_timeout;
        self
    }

    /// Override how long an interrupted session waits for the close handshake
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Token that interrupts this coordinator's sessions
    pub fn interrupt(&self) -> &CancellationToken {
        &self.interrupt
    }

    /// Run one session against `endpoint`.
    ///
    /// `action` is awaited once the receive loop is running; it is what makes
    /// the engine start producing output. Its failure is recorded in the
    /// report, the stream keeps going. Only a failed dial is an error; an
    /// interrupt while dialing returns a `UserInterrupted` report without
    /// firing `action`.
    pub async fn run<A, T, W>(
        &self,
        endpoint: &str,
        action: A,
        output: W,
    ) -> Result<SessionReport, ConnectionError>
    where
        A: Future<Output = Result<T, ActionError>>,
        W: Write + Send + 'static,
    {
        let mut state = SessionState::Dialing;
        debug!(%endpoint, %state, "Opening session");

        let dialed = tokio::select! {
            biased;
            dialed = self.dialer.dial(endpoint) => Some(dialed),
            _ = self.interrupt.cancelled() => None,
        };
        let Some(dialed) = dialed else {
            state = transition(state, SessionState::Closed);
            debug!("Interrupted while dialing, no session opened");
            return Ok(SessionReport {
                state,
                reason: TerminationReason::UserInterrupted,
                action_error: None,
            });
        };
        let Connection { inbound, outbound } = dialed?;
        let mut guard = ConnectionGuard::new(outbound);

        state = transition(state, SessionState::Streaming);
        let mut receiver = tokio::spawn(ReceiveLoop::new(inbound, output).run());
        guard.watch(receiver.abort_handle());

        let triggered = tokio::select! {
            biased;
            result = action => Some(result),
            _ = self.interrupt.cancelled() => None,
        };
        let action_error = match triggered {
            Some(Err(e)) => {
                debug!(error = %e, "Session trigger failed, still streaming");
                Some(e)
            }
            Some(Ok(_)) => None,
            None => {
                debug!("Interrupted while the trigger was pending");
                None
            }
        };

        let finished = tokio::select! {
            biased;
            joined = &mut receiver => Some(joined),
            _ = self.interrupt.cancelled() => None,
        };

        let reason = match finished {
            Some(Ok(end)) => end.reason,
            Some(Err(e)) => {
                warn!(error = %e, "Receive loop did not complete");
                TerminationReason::IoError
            }
            None => {
                state = transition(state, SessionState::Terminating);
                if let Some(outbound) = guard.outbound() {
                    negotiate(outbound, &mut receiver, self.close_timeout).await;
                }
                TerminationReason::UserInterrupted
            }
        };

        guard.release().await;
        state = transition(state, SessionState::Closed);
        debug!(%reason, "Session finished");

        Ok(SessionReport {
            state,
            reason,
            action_error,
        })
    }
}

fn transition(from: SessionState, to: SessionState) -> SessionState {
    debug!(%from, %to, "Session state transition");
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDialer, MockInbound, MockOutbound, SharedOutput, TransportStats};
    use bytes::Bytes;
    use jc_core::traits::Received;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn message(payload: &'static [u8]) -> Received {
        Received::Message(Bytes::from_static(payload))
    }

    fn closed(text: &str) -> Received {
        Received::Closed(text.to_string())
    }

    async fn trigger() -> Result<(), ActionError> {
        Ok(())
    }

    #[tokio::test]
    async fn test_frames_print_in_order_then_exit_message() {
        let stats = TransportStats::default();
        let inbound = MockInbound::scripted(vec![
            message(b"ok:"),
            message(b"io:a"),
            message(b"io:\x00b\r\n"),
            message(b"io:c"),
            closed("websocket: close 1000 (normal): exit: container abc123 stopped"),
        ]);
        let connection = Connection::new(Box::new(inbound), Box::new(MockOutbound::new(stats.clone())));
        let coordinator =
            SessionCoordinator::new(MockDialer::new(connection, stats.clone()), CancellationToken::new());
        let output = SharedOutput::default();

        let report = coordinator
            .run("ws://engine/containers/abc123/attach", trigger(), output.clone())
            .await
            .unwrap();

        assert_eq!(report.state, SessionState::Closed);
        assert_eq!(report.reason, TerminationReason::Ok);
        assert!(report.action_error.is_none());
        assert_eq!(output.contents(), "a\u{0}b\r\nccontainer abc123 stopped\n");
        assert_eq!(stats.close_frames.load(Ordering::SeqCst), 0);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_abnormal_close_reaches_closed() {
        let stats = TransportStats::default();
        let inbound = MockInbound::scripted(vec![
            message(b"ok:"),
            closed("websocket: close 1001 (going away)"),
        ]);
        let connection = Connection::new(Box::new(inbound), Box::new(MockOutbound::new(stats.clone())));
        let coordinator =
            SessionCoordinator::new(MockDialer::new(connection, stats.clone()), CancellationToken::new());
        let output = SharedOutput::default();

        let report = coordinator.run("ws://engine/x", trigger(), output.clone()).await.unwrap();

        assert_eq!(report.state, SessionState::Closed);
        assert_eq!(report.reason, TerminationReason::PeerClosed);
        assert_eq!(
            output.contents(),
            "websocket closed unexpectedly: websocket: close 1001 (going away)\n"
        );
    }

    #[tokio::test]
    async fn test_dial_failure_creates_no_session() {
        let stats = TransportStats::default();
        let coordinator =
            SessionCoordinator::new(MockDialer::unreachable(stats.clone()), CancellationToken::new());

        let err = coordinator
            .run("ws://nowhere/", trigger(), SharedOutput::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::Dial { .. }));
        assert_eq!(stats.dials.load(Ordering::SeqCst), 1);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_while_dialing_skips_trigger() {
        let stats = TransportStats::default();
        let interrupt = CancellationToken::new();
        let coordinator = SessionCoordinator::new(MockDialer::hanging(stats.clone()), interrupt.clone());
        let fired = Arc::new(AtomicBool::new(false));
        let action = {
            let fired = fired.clone();
            async move {
                fired.store(true, Ordering::SeqCst);
                Ok::<_, ActionError>(())
            }
        };
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            interrupt.cancel();
        });
        let output = SharedOutput::default();

        let report = tokio::time::timeout(
            Duration::from_secs(30),
            coordinator.run("ws://blackhole/x", action, output.clone()),
        )
        .await
        .expect("interrupt did not end a hanging dial")
        .unwrap();
        canceller.await.unwrap();

        assert_eq!(report.state, SessionState::Closed);
        assert_eq!(report.reason, TerminationReason::UserInterrupted);
        assert!(report.action_error.is_none());
        assert!(!fired.load(Ordering::SeqCst));
        assert_eq!(stats.dials.load(Ordering::SeqCst), 1);
        assert_eq!(stats.close_frames.load(Ordering::SeqCst), 0);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 0);
        assert_eq!(output.contents(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_while_trigger_hangs_terminates() {
        let stats = TransportStats::default();
        let (inbound, tx) = MockInbound::channel();
        tx.send(message(b"ok:")).unwrap();
        tx.send(message(b"io:starting\n")).unwrap();
        let outbound = MockOutbound::acknowledging(stats.clone(), tx);
        let connection = Connection::new(Box::new(inbound), Box::new(outbound));
        let interrupt = CancellationToken::new();
        let coordinator = SessionCoordinator::new(MockDialer::new(connection, stats.clone()), interrupt.clone());
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            interrupt.cancel();
        });
        let output = SharedOutput::default();

        let report = tokio::time::timeout(
            Duration::from_secs(30),
            coordinator.run(
                "ws://engine/x",
                std::future::pending::<Result<(), ActionError>>(),
                output.clone(),
            ),
        )
        .await
        .expect("interrupt did not end a hanging trigger")
        .unwrap();
        canceller.await.unwrap();

        assert_eq!(report.state, SessionState::Closed);
        assert_eq!(report.reason, TerminationReason::UserInterrupted);
        assert!(report.action_error.is_none());
        assert_eq!(stats.close_frames.load(Ordering::SeqCst), 1);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 1);
        assert_eq!(
            output.contents(),
            "starting\nwebsocket closed unexpectedly: websocket: close 1000 (normal)\n"
        );
    }

    #[tokio::test]
    async fn test_failed_trigger_keeps_streaming() {
        let stats = TransportStats::default();
        let inbound = MockInbound::scripted(vec![
            message(b"ok:"),
            closed("websocket: close 1000 (normal): exit: done"),
        ]);
        let connection = Connection::new(Box::new(inbound), Box::new(MockOutbound::new(stats.clone())));
        let coordinator =
            SessionCoordinator::new(MockDialer::new(connection, stats.clone()), CancellationToken::new());
        let output = SharedOutput::default();

        let report = coordinator
            .run(
                "ws://engine/x",
                async { Err::<(), _>(ActionError::NotModified("container already started")) },
                output.clone(),
            )
            .await
            .unwrap();

        assert_eq!(report.reason, TerminationReason::Ok);
        assert!(matches!(report.action_error, Some(ActionError::NotModified(_))));
        assert_eq!(output.contents(), "done\n");
    }

    #[tokio::test]
    async fn test_completion_wins_over_pending_interrupt() {
        let stats = TransportStats::default();
        let (inbound, tx) = MockInbound::channel();
        tx.send(closed("websocket: close 1000 (normal): exit: finished")).unwrap();
        let connection = Connection::new(Box::new(inbound), Box::new(MockOutbound::new(stats.clone())));
        let interrupt = CancellationToken::new();
        let coordinator = SessionCoordinator::new(MockDialer::new(connection, stats.clone()), interrupt.clone());

        // Interrupt only after the receive loop has had every chance to finish
        let action = async {
            for _ in 0..16 {
                tokio::task::yield_now().await;
            }
            interrupt.cancel();
            interrupt.cancel();
            Ok::<_, ActionError>(())
        };
        let report = coordinator
            .run("ws://engine/x", action, SharedOutput::default())
            .await
            .unwrap();

        assert_eq!(report.state, SessionState::Closed);
        assert_eq!(report.reason, TerminationReason::Ok);
        assert_eq!(stats.close_frames.load(Ordering::SeqCst), 0);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interrupt_acknowledged_by_peer() {
        let stats = TransportStats::default();
        let (inbound, tx) = MockInbound::channel();
        tx.send(message(b"ok:")).unwrap();
        tx.send(message(b"io:tail -f\n")).unwrap();
        let outbound = MockOutbound::acknowledging(stats.clone(), tx);
        let connection = Connection::new(Box::new(inbound), Box::new(outbound));
        let interrupt = CancellationToken::new();
        interrupt.cancel();
        let coordinator = SessionCoordinator::new(MockDialer::new(connection, stats.clone()), interrupt);
        let output = SharedOutput::default();

        let report = coordinator.run("ws://engine/x", trigger(), output.clone()).await.unwrap();

        assert_eq!(report.reason, TerminationReason::UserInterrupted);
        assert_eq!(stats.close_frames.load(Ordering::SeqCst), 1);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 1);
        assert_eq!(
            output.contents(),
            "tail -f\nwebsocket closed unexpectedly: websocket: close 1000 (normal)\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unacknowledged_interrupt_times_out_and_releases_once() {
        let stats = TransportStats::default();
        let inbound = MockInbound::scripted(vec![message(b"ok:")]);
        let connection = Connection::new(Box::new(inbound), Box::new(MockOutbound::new(stats.clone())));
        let interrupt = CancellationToken::new();
        let coordinator = SessionCoordinator::new(MockDialer::new(connection, stats.clone()), interrupt.clone())
            .with_close_timeout(Duration::from_millis(500));

        let started = tokio::time::Instant::now();
        let canceller = {
            let interrupt = interrupt.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(3)).await;
                interrupt.cancel();
            })
        };
        let report = coordinator
            .run("ws://engine/x", trigger(), SharedOutput::default())
            .await
            .unwrap();
        canceller.await.unwrap();

        assert_eq!(report.state, SessionState::Closed);
        assert_eq!(report.reason, TerminationReason::UserInterrupted);
        assert_eq!(stats.close_frames.load(Ordering::SeqCst), 1);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 1);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(3500), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(4), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn test_config_sets_close_timeout() {
        let stats = TransportStats::default();
        let config = SessionConfig {
            close_timeout: Duration::from_millis(50),
        };
        let coordinator = SessionCoordinator::new(MockDialer::unreachable(stats), CancellationToken::new())
            .with_config(&config);
        assert_eq!(coordinator.close_timeout, Duration::from_millis(50));
        assert!(!coordinator.interrupt().is_cancelled());
    }
}
