//! Close descriptions and terminal events
//!
//! The engine ends a session by closing the WebSocket. A clean exit is a
//! normal closure (1000) whose reason starts with `exit:`; the rest of the
//! reason is a message meant for the user. The engine's reference client
//! matches on the canonical rendering of the close frame,
//! `websocket: close <code> (<name>): <reason>`, so this module produces the
//! same rendering and matches the same marker against it.

use std::fmt;

/// Normal closure status code
pub const CLOSE_NORMAL: u16 = 1000;

/// Prefix of the close description that marks a successful end of stream
pub const EXIT_MARKER: &str = "websocket: close 1000 (normal): exit:";

/// Human-readable name of a close code, as the engine renders it
fn close_code_name(code: u16) -> Option<&'static str> {
    Some(match code {
        1000 => "normal",
        1001 => "going away",
        1002 => "protocol error",
        1003 => "unsupported data",
        1005 => "no status",
        1006 => "abnormal closure",
        1007 => "invalid payload data",
        1008 => "policy violation",
        1009 => "message too big",
        1010 => "mandatory extension missing",
        1011 => "internal server error",
        1012 => "service restart",
        1013 => "try again later",
        1015 => "TLS handshake error",
        _ => return None,
    })
}

/// Render a close frame in its canonical textual form.
///
/// ```
/// use jc_protocol::describe_close;
///
/// assert_eq!(
///     describe_close(1000, "exit: done"),
///     "websocket: close 1000 (normal): exit: done"
/// );
/// assert_eq!(describe_close(1006, ""), "websocket: close 1006 (abnormal closure)");
/// ```
pub fn describe_close(code: u16, reason: &str) -> String {
    let mut text = format!("websocket: close {}", code);
    if let Some(name) = close_code_name(code) {
        text.push_str(&format!(" ({})", name));
    }
    if !reason.is_empty() {
        text.push_str(": ");
        text.push_str(reason);
    }
    text
}

/// How a session stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Clean exit; carries the completion message sent by the engine
    Exit(String),
    /// Any other close or read failure; carries the raw description
    Abnormal(String),
}

impl Termination {
    /// Interpret a close description.
    pub fn from_close_text(text: &str) -> Self {
        match text.strip_prefix(EXIT_MARKER) {
            Some(message) => Termination::Exit(message.trim_start().to_string()),
            None => Termination::Abnormal(text.to_string()),
        }
    }

    /// Whether the engine marked the stream as successfully finished
    pub fn is_exit(&self) -> bool {
        matches!(self, Termination::Exit(_))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exit(message) => write!(f, "{}", message),
            Termination::Abnormal(reason) => {
                write!(f, "websocket closed unexpectedly: {}", reason)
            }
        }
    }
}
