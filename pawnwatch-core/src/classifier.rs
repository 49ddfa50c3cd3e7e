//! Event signature classification.
//!
//! Maps the first topic of a raw log to one of the event kinds the listener
//! routes from the raw log feed. `PawnRepaid` and `PawnLiquidated` arrive on
//! their own typed subscriptions and are deliberately absent from this table
//! so each on-chain event is handled once.

use std::collections::HashMap;

use alloy::primitives::{B256, keccak256};
use alloy::rpc::types::Log;

/// Canonical event signatures of the pawning shop contract.
pub mod signatures {
    pub const PAWN_CREATED: &str = "PawnCreated(uint256,address)";
    pub const PAWN_CANCELLED: &str = "PawnCancelled(uint256,address)";
    pub const PAWN_REPAID: &str = "PawnRepaid(uint256,uint256,address,address)";
    pub const PAWN_LIQUIDATED: &str = "PawnLiquidated(uint256,uint256,address,address)";
    pub const BID_CREATED: &str = "BidCreated(uint256,uint256,address)";
    pub const BID_CANCELLED: &str = "BidCancelled(uint256,uint256)";
    pub const BID_ACCEPTED: &str = "BidAccepted(uint256,uint256,address,address)";
    pub const WHITE_LIST_ADDED: &str = "WhiteListAdded(address)";
    pub const WHITE_LIST_REMOVED: &str = "WhiteListRemoved(address)";
}

/// Event kinds recognised on the raw log feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    PawnCreated,
    PawnCancelled,
    BidCreated,
    BidCancelled,
    BidAccepted,
    WhiteListAdded,
    WhiteListRemoved,
}

impl LogKind {
    pub const ALL: [LogKind; 7] = [
        LogKind::PawnCreated,
        LogKind::PawnCancelled,
        LogKind::BidCreated,
        LogKind::BidCancelled,
        LogKind::BidAccepted,
        LogKind::WhiteListAdded,
        LogKind::WhiteListRemoved,
    ];

    /// Canonical signature string hashed into the log's first topic.
    pub const fn signature(self) -> &'static str {
        match self {
            LogKind::PawnCreated => signatures::PAWN_CREATED,
            LogKind::PawnCancelled => signatures::PAWN_CANCELLED,
            LogKind::BidCreated => signatures::BID_CREATED,
            LogKind::BidCancelled => signatures::BID_CANCELLED,
            LogKind::BidAccepted => signatures::BID_ACCEPTED,
            LogKind::WhiteListAdded => signatures::WHITE_LIST_ADDED,
            LogKind::WhiteListRemoved => signatures::WHITE_LIST_REMOVED,
        }
    }
}

/// Hash an event signature the way the chain encodes it into topic 0.
pub fn signature_hash(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// Exact-match lookup table from topic hash to [`LogKind`].
#[derive(Debug, Clone)]
pub struct SignatureClassifier {
    table: HashMap<B256, LogKind>,
}

impl SignatureClassifier {
    pub fn new() -> Self {
        let table = LogKind::ALL
            .into_iter()
            .map(|kind| (signature_hash(kind.signature()), kind))
            .collect();
        Self { table }
    }

    /// Classify a topic hash. `None` means the event is not of interest.
    pub fn classify(&self, topic: &B256) -> Option<LogKind> {
        self.table.get(topic).copied()
    }

    /// Classify a log by its first topic. Anonymous logs are unknown.
    pub fn classify_log(&self, log: &Log) -> Option<LogKind> {
        log.topics().first().and_then(|topic| self.classify(topic))
    }
}

impl Default for SignatureClassifier {
    fn default() -> Self {
        Self::new()
    }
}
