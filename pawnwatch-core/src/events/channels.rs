//! Feed channels between the event source and the dispatcher.

use alloy::rpc::types::Log;
use tokio::sync::mpsc;

use crate::contracts::PawningShop::{PawnLiquidated, PawnRepaid};

/// Buffer size of each data channel.
///
/// A slow backend stalls the dispatcher; this bounds how far the source can
/// run ahead of it.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Identifies one of the node subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    /// All logs emitted by the contract.
    Logs,
    /// Typed `PawnRepaid` events.
    PawnRepaid,
    /// Typed `PawnLiquidated` events.
    PawnLiquidated,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feed::Logs => write!(f, "logs"),
            Feed::PawnRepaid => write!(f, "PawnRepaid"),
            Feed::PawnLiquidated => write!(f, "PawnLiquidated"),
        }
    }
}

/// An unrecoverable failure reported by a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionError {
    pub feed: Feed,
    pub message: String,
}

impl SubscriptionError {
    pub fn new(feed: Feed, message: impl Into<String>) -> Self {
        Self {
            feed,
            message: message.into(),
        }
    }
}

/// Producer half of every feed, held by the event source.
#[derive(Debug, Clone)]
pub struct FeedSenders {
    pub logs: mpsc::Sender<Log>,
    pub log_errors: mpsc::Sender<SubscriptionError>,
    pub repaid: mpsc::Sender<PawnRepaid>,
    pub repaid_errors: mpsc::Sender<SubscriptionError>,
    pub liquidated: mpsc::Sender<PawnLiquidated>,
    pub liquidated_errors: mpsc::Sender<SubscriptionError>,
}

/// Consumer half of every feed, owned by the dispatcher.
#[derive(Debug)]
pub struct EventFeeds {
    pub logs: mpsc::Receiver<Log>,
    pub log_errors: mpsc::Receiver<SubscriptionError>,
    pub repaid: mpsc::Receiver<PawnRepaid>,
    pub repaid_errors: mpsc::Receiver<SubscriptionError>,
    pub liquidated: mpsc::Receiver<PawnLiquidated>,
    pub liquidated_errors: mpsc::Receiver<SubscriptionError>,
}

/// Create the data and error channel of every feed.
///
/// Each error channel holds a single message: the first error is terminal.
pub fn event_feeds() -> (FeedSenders, EventFeeds) {
    let (logs_tx, logs_rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
    let (log_errors_tx, log_errors_rx) = mpsc::channel(1);
    let (repaid_tx, repaid_rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
    let (repaid_errors_tx, repaid_errors_rx) = mpsc::channel(1);
    let (liquidated_tx, liquidated_rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
    let (liquidated_errors_tx, liquidated_errors_rx) = mpsc::channel(1);

    let senders = FeedSenders {
        logs: logs_tx,
        log_errors: log_errors_tx,
        repaid: repaid_tx,
        repaid_errors: repaid_errors_tx,
        liquidated: liquidated_tx,
        liquidated_errors: liquidated_errors_tx,
    };
    let feeds = EventFeeds {
        logs: logs_rx,
        log_errors: log_errors_rx,
        repaid: repaid_rx,
        repaid_errors: repaid_errors_rx,
        liquidated: liquidated_rx,
        liquidated_errors: liquidated_errors_rx,
    };
    (senders, feeds)
}
