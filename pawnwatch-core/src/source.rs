//! Node subscriptions feeding the dispatcher.
//!
//! Three subscriptions are opened over the provider's WebSocket transport:
//! every log of the contract, plus typed `PawnRepaid` and `PawnLiquidated`
//! feeds filtered by event signature. Each one is drained by its own
//! forwarding task.

use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use alloy::transports::TransportError;
use futures_util::stream::{Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::contracts::PawningShop::{PawnLiquidated, PawnRepaid};
use crate::events::types::decode_event;
use crate::events::{EventFeeds, Feed, SubscriptionError, event_feeds};

/// Errors raised while opening the subscriptions.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to subscribe to {feed}: {source}")]
    Subscribe {
        feed: Feed,
        #[source]
        source: TransportError,
    },
}

/// Owns the forwarding tasks. Dropping it aborts them.
#[derive(Debug)]
pub struct SourceHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Open every subscription for `contract` and start forwarding.
pub async fn subscribe<P: Provider>(
    provider: &P,
    contract: Address,
) -> Result<(EventFeeds, SourceHandle), SourceError> {
    let (senders, feeds) = event_feeds();

    let all_logs = Filter::new().address(contract);
    let logs = provider
        .subscribe_logs(&all_logs)
        .await
        .map_err(|source| SourceError::Subscribe {
            feed: Feed::Logs,
            source,
        })?;

    let repaid = provider
        .subscribe_logs(&typed_filter::<PawnRepaid>(contract))
        .await
        .map_err(|source| SourceError::Subscribe {
            feed: Feed::PawnRepaid,
            source,
        })?;

    let liquidated = provider
        .subscribe_logs(&typed_filter::<PawnLiquidated>(contract))
        .await
        .map_err(|source| SourceError::Subscribe {
            feed: Feed::PawnLiquidated,
            source,
        })?;

    info!(contract = %contract, "Subscribed to contract events");

    let tasks = vec![
        tokio::spawn(forward_logs(
            logs.into_stream(),
            senders.logs,
            senders.log_errors,
        )),
        tokio::spawn(forward_typed(
            Feed::PawnRepaid,
            repaid.into_stream(),
            senders.repaid,
            senders.repaid_errors,
        )),
        tokio::spawn(forward_typed(
            Feed::PawnLiquidated,
            liquidated.into_stream(),
            senders.liquidated,
            senders.liquidated_errors,
        )),
    ];

    Ok((feeds, SourceHandle { tasks }))
}

fn typed_filter<E: SolEvent>(contract: Address) -> Filter {
    Filter::new()
        .address(contract)
        .event_signature(E::SIGNATURE_HASH)
}

/// Push raw logs into the data channel until the stream ends.
async fn forward_logs<S>(
    stream: S,
    data: mpsc::Sender<Log>,
    errors: mpsc::Sender<SubscriptionError>,
) where
    S: Stream<Item = Log>,
{
    let mut stream = std::pin::pin!(stream);
    while let Some(log) = stream.next().await {
        if data.send(log).await.is_err() {
            debug!(feed = %Feed::Logs, "Dispatcher gone, stopping forwarder");
            return;
        }
    }
    report(&errors, Feed::Logs, "subscription stream ended").await;
}

/// Decode logs as `E` and push them into the data channel.
///
/// A log that does not decode is reported and ends the feed.
async fn forward_typed<E, S>(
    feed: Feed,
    stream: S,
    data: mpsc::Sender<E>,
    errors: mpsc::Sender<SubscriptionError>,
) where
    E: SolEvent,
    S: Stream<Item = Log>,
{
    let mut stream = std::pin::pin!(stream);
    while let Some(log) = stream.next().await {
        let event = match decode_event::<E>(&log) {
            Ok(event) => event,
            Err(e) => {
                report(&errors, feed, format!("failed to decode log: {e}")).await;
                return;
            }
        };
        if data.send(event).await.is_err() {
            debug!(feed = %feed, "Dispatcher gone, stopping forwarder");
            return;
        }
    }
    report(&errors, feed, "subscription stream ended").await;
}

async fn report(
    errors: &mpsc::Sender<SubscriptionError>,
    feed: Feed,
    message: impl Into<String>,
) {
    let error = SubscriptionError::new(feed, message);
    warn!(feed = %feed, error = %error.message, "Subscription failed");
    // A closed channel means the dispatcher already stopped.
    let _ = errors.send(error).await;
}
