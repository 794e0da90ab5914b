//! jc-core: Core abstractions and configuration for jcli
//!
//! This crate provides the error taxonomy, configuration structures,
//! transport traits, engine API types, and endpoint construction shared by
//! the session crate and the command-line client.

pub mod api;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod traits;

pub use endpoint::{BuildOptions, EngineUrl};
pub use error::JcError;
