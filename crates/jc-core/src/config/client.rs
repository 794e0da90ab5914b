//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_millis;

/// Engine URL used when neither the config file nor `--host` sets one
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:8085/";

/// How long an interrupted session waits for the engine to acknowledge
/// the close frame before giving up
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Engine connection settings
    pub engine: EngineConfig,

    /// Streaming session settings
    pub session: SessionConfig,
}

/// Where the engine lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the engine's HTTP API; the stream endpoints share its host
    pub url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENGINE_URL.to_string(),
        }
    }
}

/// Streaming session tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Grace period for the close handshake after an interrupt
    #[serde(rename = "close_timeout_ms", with = "duration_millis")]
    pub close_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}
