//! Event model and channel plumbing.
//!
//! # Event Flow
//!
//! 1. The event source forwards raw logs and typed `PawnRepaid` /
//!    `PawnLiquidated` events into [`EventFeeds`].
//! 2. The dispatcher classifies raw logs and decodes them into
//!    [`PawnEvent`] or [`ContractNotice`].
//! 3. Each `PawnEvent` is handed to the pawn handler, one at a time.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, EventFeeds, Feed, FeedSenders, SubscriptionError, event_feeds,
};
pub use types::{ContractNotice, DecodedLog, PawnEvent};
