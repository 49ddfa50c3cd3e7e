//! TOML file configuration structures.
//!
//! These structs directly map to the `pawnwatch.toml` file format.

use pawnwatch_core::config::DEFAULT_BACKEND_TIMEOUT;
use serde::Deserialize;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    pub backend: BackendConfig,
}

/// Network configuration section.
///
/// Both fields may instead come from the command line or the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkConfig {
    /// WebSocket endpoint of the node (e.g., "wss://node.example/ws").
    pub endpoint: Option<String>,
    /// Address of the pawn shop contract.
    pub contract_address: Option<String>,
}

/// Backend API configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., "https://api.example.com").
    pub base_url: String,
    /// Key identifying this listener to the backend.
    pub api_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_BACKEND_TIMEOUT.as_secs()
}
