//! jc-session: Streaming sessions against a jocker engine
//!
//! A session attaches to a container console or a running image build:
//! it dials the engine's WebSocket endpoint, relays output frames to the
//! terminal as they arrive, fires the HTTP action that makes the engine
//! start producing output, and winds down when the engine closes the
//! stream or the user interrupts.
//!
//! ## Lifecycle
//!
//! `Dialing → Streaming → Terminating → Closed`
//!
//! `Terminating` is only entered on interrupt: a close frame is sent and the
//! engine gets [`DEFAULT_CLOSE_TIMEOUT`] to acknowledge it before the
//! connection is dropped anyway.

pub mod coordinator;
pub mod negotiator;
pub mod receiver;
pub mod state;
pub mod transport;

#[cfg(test)]
mod mock;

pub use coordinator::{SessionCoordinator, SessionReport};
pub use jc_core::config::DEFAULT_CLOSE_TIMEOUT;
pub use negotiator::negotiate;
pub use receiver::{ReceiveLoop, StreamEnd};
pub use state::{SessionState, TerminationReason};
pub use transport::WsDialer;
