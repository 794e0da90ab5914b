//! Engine HTTP API types
//!
//! JSON bodies exchanged with the jocker engine's REST API. Summary fields
//! default when the engine omits them so a partially filled listing still
//! renders.

use serde::{Deserialize, Serialize};

/// Body of most mutating calls: the id of the affected resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: String,
}

/// Request body for container creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Image to create the container from
    pub image: String,
    /// Command and arguments; empty means the image default
    #[serde(default)]
    pub cmd: Vec<String>,
    /// Networks to connect at creation time
    #[serde(default)]
    pub networks: Vec<String>,
    /// Volume bind mounts
    #[serde(default)]
    pub volumes: Vec<String>,
    /// Environment variables, `NAME=value`
    #[serde(default)]
    pub env: Vec<String>,
    /// Jail parameters, see jail(8)
    #[serde(default)]
    pub jail_param: Vec<String>,
}

/// One row of the container listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub command: String,
    pub image_id: String,
    pub running: bool,
    /// RFC 3339 creation timestamp
    pub created: String,
}

/// One row of the image listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSummary {
    pub id: String,
    pub name: String,
    pub tag: String,
    pub command: String,
    /// RFC 3339 creation timestamp
    pub created: String,
}

/// Request body for network creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub driver: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ifname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subnet: String,
}

/// One row of the network listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSummary {
    pub id: String,
    pub name: String,
    pub driver: String,
}
