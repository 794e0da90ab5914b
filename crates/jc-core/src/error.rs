//! Core error types for jcli

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the jcli crates
#[derive(Error, Debug)]
pub enum JcError {
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors establishing a session stream
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Endpoint could not be dialed
    #[error("dial {endpoint}: {reason}")]
    Dial { endpoint: String, reason: String },

    /// Endpoint is not a usable WebSocket URI
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Errors on an established session stream
#[derive(Error, Debug)]
pub enum StreamError {
    /// Reading the next message failed
    #[error("read failed: {0}")]
    Read(String),

    /// Writing a frame failed
    #[error("send failed: {0}")]
    Send(String),
}

/// Errors reported by the engine's HTTP API
#[derive(Error, Debug)]
pub enum ActionError {
    /// The engine could not be reached
    #[error("Could not connect to jocker engine daemon: {0}")]
    Request(String),

    /// Resource does not exist (404)
    #[error("no such {0}")]
    NotFound(&'static str),

    /// Nothing to do (304), e.g. container already started
    #[error("{0}")]
    NotModified(&'static str),

    /// Engine failed internally (500)
    #[error("internal server error")]
    ServerError,

    /// Any other status code
    #[error("Jocker engine returned unsuccessful statuscode: {0}")]
    UnexpectedStatus(u16),

    /// Body did not match the expected shape
    #[error("could not parse jocker engine response: {0}")]
    InvalidResponse(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// Engine host could not be turned into a URL
    #[error("Invalid engine host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
