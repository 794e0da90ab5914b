//! Receive loop
//!
//! Drains the inbound half of a session: data frames go to the output
//! verbatim, the ready acknowledgement and anything unrecognized are
//! dropped, and the terminal event is printed as a single line before the
//! loop returns.

use std::io::Write;

use tracing::{debug, trace, warn};

use jc_core::traits::{Inbound, Received};
use jc_protocol::{Frame, Termination};

use crate::state::TerminationReason;

/// How the receive loop finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEnd {
    /// Terminal event as printed to the user
    pub termination: Termination,
    /// Classification for the coordinator
    pub reason: TerminationReason,
}

/// Relays a session's inbound frames to `W` until the stream ends
pub struct ReceiveLoop<W> {
    inbound: Box<dyn Inbound>,
    output: W,
    ready: bool,
}

impl<W: Write + Send + 'static> ReceiveLoop<W> {
    pub fn new(inbound: Box<dyn Inbound>, output: W) -> Self {
        Self {
            inbound,
            output,
            ready: false,
        }
    }

    /// Run until the peer closes the stream or reading fails
    pub async fn run(mut self) -> StreamEnd {
        loop {
            match self.inbound.receive().await {
                Received::Message(payload) => match Frame::decode(payload) {
                    Some(Frame::Ready) => {
                        debug!("Session stream ready");
                        self.ready = true;
                    }
                    Some(Frame::Data(data)) => {
                        if !self.ready {
                            trace!("Output frame before ready acknowledgement");
                        }
                        self.emit(&data);
                    }
                    None => {}
                },
                Received::Closed(text) => {
                    let termination = Termination::from_close_text(&text);
                    let reason = if termination.is_exit() {
                        TerminationReason::Ok
                    } else {
                        TerminationReason::PeerClosed
                    };
                    debug!(close = %text, %reason, "Session stream closed by peer");
                    return self.finish(termination, reason);
                }
                Received::Failed(err) => {
                    debug!(error = %err, "Session stream failed");
                    return self.finish(
                        Termination::Abnormal(err.to_string()),
                        TerminationReason::IoError,
                    );
                }
            }
        }
    }

    fn emit(&mut self, data: &[u8]) {
        let result = self
            .output
            .write_all(data)
            .and_then(|_| self.output.flush());
        if let Err(e) = result {
            warn!(error = %e, "Failed to write session output");
        }
    }

    fn finish(mut self, termination: Termination, reason: TerminationReason) -> StreamEnd {
        if let Err(e) = writeln!(self.output, "{}", termination).and_then(|_| self.output.flush())
        {
            warn!(error = %e, "Failed to write session result");
        }
        StreamEnd {
            termination,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockInbound, SharedOutput};
    use bytes::Bytes;
    use jc_core::error::StreamError;

    fn message(payload: &'static [u8]) -> Received {
        Received::Message(Bytes::from_static(payload))
    }

    #[tokio::test]
    async fn test_relays_output_and_exit_message() {
        let output = SharedOutput::default();
        let inbound = MockInbound::scripted(vec![
            message(b"ok:"),
            message(b"io:hello "),
            message(b"io:world\n"),
            Received::Closed("websocket: close 1000 (normal): exit: done".to_string()),
        ]);

        let end = ReceiveLoop::new(Box::new(inbound), output.clone()).run().await;

        assert_eq!(end.reason, TerminationReason::Ok);
        assert_eq!(end.termination, Termination::Exit("done".to_string()));
        assert_eq!(output.contents(), "hello world\ndone\n");
    }

    #[tokio::test]
    async fn test_ignores_unknown_and_short_frames() {
        let output = SharedOutput::default();
        let inbound = MockInbound::scripted(vec![
            message(b"io"),
            message(b"xx:noise"),
            message(b"ok:"),
            message(b"io:kept"),
            Received::Closed("websocket: close 1000 (normal): exit:".to_string()),
        ]);

        ReceiveLoop::new(Box::new(inbound), output.clone()).run().await;

        assert_eq!(output.contents(), "kept\n");
    }

    #[tokio::test]
    async fn test_close_without_exit_marker_is_unexpected() {
        let output = SharedOutput::default();
        let inbound = MockInbound::scripted(vec![
            message(b"ok:"),
            Received::Closed("websocket: close 1011 (internal server error)".to_string()),
        ]);

        let end = ReceiveLoop::new(Box::new(inbound), output.clone()).run().await;

        assert_eq!(end.reason, TerminationReason::PeerClosed);
        assert_eq!(
            output.contents(),
            "websocket closed unexpectedly: websocket: close 1011 (internal server error)\n"
        );
    }

    #[tokio::test]
    async fn test_read_failure_is_io_error() {
        let output = SharedOutput::default();
        let inbound = MockInbound::scripted(vec![
            message(b"io:partial"),
            Received::Failed(StreamError::Read("connection reset".to_string())),
        ]);

        let end = ReceiveLoop::new(Box::new(inbound), output.clone()).run().await;

        assert_eq!(end.reason, TerminationReason::IoError);
        assert_eq!(
            output.contents(),
            "partialwebsocket closed unexpectedly: read failed: connection reset\n"
        );
    }
}
