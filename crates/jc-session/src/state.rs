//! Session lifecycle state

use std::fmt;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connecting to the stream endpoint
    Dialing,
    /// Receive loop running, output being relayed
    Streaming,
    /// Interrupted; close handshake in progress
    Terminating,
    /// Connection released
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Dialing => write!(f, "dialing"),
            SessionState::Streaming => write!(f, "streaming"),
            SessionState::Terminating => write!(f, "terminating"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Engine closed the stream with the clean-exit marker
    Ok,
    /// The stream broke or the receive loop failed
    IoError,
    /// Engine closed the stream without the clean-exit marker
    PeerClosed,
    /// The user interrupted the session
    UserInterrupted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Ok => write!(f, "ok"),
            TerminationReason::IoError => write!(f, "io-error"),
            TerminationReason::PeerClosed => write!(f, "peer-closed"),
            TerminationReason::UserInterrupted => write!(f, "user-interrupted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(SessionState::Terminating.to_string(), "terminating");
        assert_eq!(TerminationReason::UserInterrupted.to_string(), "user-interrupted");
        assert_eq!(TerminationReason::IoError.to_string(), "io-error");
    }
}
