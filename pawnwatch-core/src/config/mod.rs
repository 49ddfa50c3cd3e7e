//! Configuration types for the pawn listener.
//!
//! These types represent the validated runtime configuration. Loading and
//! parsing is handled by the listener binary.

mod backend;
mod network;

pub use backend::{BackendConfig, DEFAULT_BACKEND_TIMEOUT};
pub use network::NetworkConfig;

/// Complete validated configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Node endpoint and watched contract.
    pub network: NetworkConfig,
    /// Backend API location and credentials.
    pub backend: BackendConfig,
}
