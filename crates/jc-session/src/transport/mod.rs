//! Session transports
//!
//! The coordinator only knows the [`jc_core::traits`] halves; this module
//! provides the WebSocket implementation used against a real engine.

mod websocket;

pub use websocket::{WsDialer, WsInbound, WsOutbound};
