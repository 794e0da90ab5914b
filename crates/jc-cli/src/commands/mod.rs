//! Command implementations

pub mod config;
pub mod container;
pub mod image;
pub mod network;
mod session;

use std::path::Path;

use jc_core::config::{load_or_default, SessionConfig};
use jc_core::{EngineUrl, JcError};

use crate::engine::EngineClient;

/// Everything the engine-facing commands need
pub struct EngineContext {
    pub client: EngineClient,
    pub session: SessionConfig,
}

impl EngineContext {
    /// Load the config file and apply a `--host` override
    pub fn load(config_path: Option<&Path>, host: Option<&str>) -> Result<Self, JcError> {
        let config = load_or_default(config_path)?;
        let url = EngineUrl::parse(host.unwrap_or(&config.engine.url))?;
        tracing::debug!(engine = %url, "Using jocker engine");

        Ok(Self {
            client: EngineClient::new(url),
            session: config.session,
        })
    }
}
