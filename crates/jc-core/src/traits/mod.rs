//! Core trait definitions

mod transport;

pub use transport::{Connection, Dialer, Inbound, Outbound, Received};
