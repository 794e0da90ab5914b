//! jc-protocol: Stream framing for jocker engine sessions
//!
//! The engine pushes console and build output over a WebSocket as text
//! messages tagged with a 3-byte marker, and ends the stream with a close
//! frame whose reason tells a clean exit apart from a failure. This crate
//! classifies both without touching the network.

pub mod close;
pub mod frame;

pub use close::{describe_close, Termination, CLOSE_NORMAL, EXIT_MARKER};
pub use frame::{Frame, DATA_MARKER, MARKER_LEN, READY_MARKER};
