//! Network configuration.

use alloy::primitives::Address;
use url::Url;

/// Where events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// WebSocket endpoint of the node (`ws://` or `wss://`).
    pub endpoint: Url,
    /// Address of the pawn shop contract.
    pub contract_address: Address,
}
