//! Transport traits
//!
//! A session stream is a duplex, message-oriented connection. Once dialed it
//! is split in two: the receive loop owns the [`Inbound`] half, the session
//! coordinator owns the [`Outbound`] half. The only thing the coordinator
//! ever writes is the close frame.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{ConnectionError, StreamError};

/// Result of waiting for the next inbound message
#[derive(Debug)]
pub enum Received {
    /// A complete application message
    Message(Bytes),
    /// The peer closed the stream; carries the close description
    Closed(String),
    /// The stream broke without a close handshake
    Failed(StreamError),
}

/// Receiving half of a session connection
#[async_trait]
pub trait Inbound: Send {
    /// Wait for the next message or for the stream to end.
    ///
    /// Once this has returned [`Received::Closed`] or [`Received::Failed`]
    /// it must not be called again.
    async fn receive(&mut self) -> Received;
}

/// Sending half of a session connection
#[async_trait]
pub trait Outbound: Send {
    /// Send a normal-closure close frame with the given reason
    async fn send_close(&mut self, reason: &str) -> Result<(), StreamError>;

    /// Release the connection. Calling this more than once is harmless.
    async fn close(&mut self);
}

/// Both halves of a freshly dialed connection
pub struct Connection {
    /// Half read by the receive loop
    pub inbound: Box<dyn Inbound>,
    /// Half written by the coordinator
    pub outbound: Box<dyn Outbound>,
}

impl Connection {
    /// Bundle two halves into a connection
    pub fn new(inbound: Box<dyn Inbound>, outbound: Box<dyn Outbound>) -> Self {
        Self { inbound, outbound }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens session connections
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Establish a connection to `endpoint`
    async fn dial(&self, endpoint: &str) -> Result<Connection, ConnectionError>;
}
