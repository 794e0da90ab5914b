//! Frame classification
//!
//! Every application message on a session stream starts with a 3-byte
//! marker:
//! - `ok:` — the stream is established (control, carries nothing)
//! - `io:` — console/build output; everything after the marker is emitted verbatim
//!
//! Anything else, including messages shorter than the marker, is not part
//! of the protocol and is dropped.

use bytes::Bytes;

/// Length of every frame marker in bytes
pub const MARKER_LEN: usize = 3;

/// Marker of the control frame sent once the stream is ready
pub const READY_MARKER: &[u8; MARKER_LEN] = b"ok:";

/// Marker of a data frame
pub const DATA_MARKER: &[u8; MARKER_LEN] = b"io:";

/// A decoded inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Stream-ready acknowledgement; consumed silently
    Ready,
    /// Output to write to stdout exactly as received
    Data(Bytes),
}

impl Frame {
    /// Classify a raw message payload.
    ///
    /// Returns `None` for payloads that carry neither marker.
    pub fn decode(payload: Bytes) -> Option<Self> {
        let marker = payload.get(..MARKER_LEN)?;

        if marker == READY_MARKER {
            Some(Frame::Ready)
        } else if marker == DATA_MARKER {
            Some(Frame::Data(payload.slice(MARKER_LEN..)))
        } else {
            tracing::trace!(len = payload.len(), "Ignoring unrecognized frame");
            None
        }
    }

    /// Bytes to print for this frame (empty for control frames)
    pub fn output(&self) -> &[u8] {
        match self {
            Frame::Ready => &[],
            Frame::Data(data) => data,
        }
    }
}
