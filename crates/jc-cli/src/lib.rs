//! jcli library
//!
//! Command implementations, the engine REST client and output helpers behind
//! the `jcli` binary.

pub mod commands;
pub mod engine;
pub mod output;
pub mod signal;
