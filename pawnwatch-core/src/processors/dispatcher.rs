//! EventDispatcher processor.
//!
//! The EventDispatcher is responsible for:
//! - Waiting on every feed and error channel at once, with no priority among
//!   ready sources
//! - Classifying raw logs by topic hash and decoding them
//! - Handing typed `PawnRepaid` / `PawnLiquidated` events straight to the
//!   handler
//! - Returning an error as soon as any subscription reports one
//! - Returning `FeedsClosed` once every data feed has closed
//!
//! Events are handled one at a time: the next one is not dequeued until the
//! handler's outbound calls have completed.

use alloy::rpc::types::Log;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::pawn_handler::{HandlerError, PawnEventHandler};
use crate::backend::{PawnBackend, PawnReader};
use crate::classifier::SignatureClassifier;
use crate::events::{DecodedLog, EventFeeds, Feed, PawnEvent, SubscriptionError};

/// Reasons the dispatcher stops.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A node subscription failed and cannot recover by itself.
    #[error("{feed} subscription failed: {message}")]
    Subscription { feed: Feed, message: String },

    /// A handler hit a fatal error.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// Every feed closed without reporting an error.
    #[error("all event feeds closed")]
    FeedsClosed,
}

impl From<SubscriptionError> for DispatchError {
    fn from(error: SubscriptionError) -> Self {
        DispatchError::Subscription {
            feed: error.feed,
            message: error.message,
        }
    }
}

/// Single loop routing feed arrivals to the pawn handler.
pub struct EventDispatcher<B, R> {
    classifier: SignatureClassifier,
    handler: PawnEventHandler<B, R>,
    feeds: EventFeeds,
    shutdown_rx: watch::Receiver<bool>,
}

impl<B: PawnBackend, R: PawnReader> EventDispatcher<B, R> {
    /// Create a new EventDispatcher.
    ///
    /// # Arguments
    ///
    /// * `handler` - Handler invoked for every pawn event
    /// * `feeds` - Consumer half of the event source's channels
    /// * `shutdown_rx` - Receiver for shutdown signal
    pub fn new(
        handler: PawnEventHandler<B, R>,
        feeds: EventFeeds,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            classifier: SignatureClassifier::new(),
            handler,
            feeds,
            shutdown_rx,
        }
    }

    /// Run until shutdown or a fatal error.
    ///
    /// Returns `Ok(())` only when shutdown is requested (or the shutdown
    /// sender is dropped).
    pub async fn run(mut self) -> Result<(), DispatchError> {
        info!("EventDispatcher started");

        let mut logs_open = true;
        let mut repaid_open = true;
        let mut liquidated_open = true;

        loop {
            if !(logs_open || repaid_open || liquidated_open) {
                if let Some(error) = self.pending_error() {
                    return Err(error.into());
                }
                warn!("All event feeds closed");
                return Err(DispatchError::FeedsClosed);
            }

            tokio::select! {
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("EventDispatcher shutting down");
                        return Ok(());
                    }
                }

                Some(error) = self.feeds.log_errors.recv() => return Err(error.into()),
                log = self.feeds.logs.recv(), if logs_open => match log {
                    Some(log) => {
                        self.fail_on_pending_error()?;
                        self.dispatch_log(log).await?;
                    }
                    None => logs_open = false,
                },

                Some(error) = self.feeds.repaid_errors.recv() => return Err(error.into()),
                repaid = self.feeds.repaid.recv(), if repaid_open => match repaid {
                    Some(repaid) => {
                        self.fail_on_pending_error()?;
                        self.handler.handle(PawnEvent::from(repaid)).await?;
                    }
                    None => repaid_open = false,
                },

                Some(error) = self.feeds.liquidated_errors.recv() => return Err(error.into()),
                liquidated = self.feeds.liquidated.recv(), if liquidated_open => match liquidated {
                    Some(liquidated) => {
                        self.fail_on_pending_error()?;
                        self.handler.handle(PawnEvent::from(liquidated)).await?;
                    }
                    None => liquidated_open = false,
                },
            }
        }
    }

    /// A subscription error already queued on any error channel.
    fn pending_error(&mut self) -> Option<SubscriptionError> {
        self.feeds
            .log_errors
            .try_recv()
            .or_else(|_| self.feeds.repaid_errors.try_recv())
            .or_else(|_| self.feeds.liquidated_errors.try_recv())
            .ok()
    }

    /// No event is handled once any subscription has reported an error.
    fn fail_on_pending_error(&mut self) -> Result<(), DispatchError> {
        match self.pending_error() {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    /// Classify, decode and handle one raw log.
    async fn dispatch_log(&self, log: Log) -> Result<(), HandlerError> {
        let Some(topic) = log.topics().first() else {
            debug!("Ignoring log without topics");
            return Ok(());
        };
        debug!(topic = %topic, "Incoming event hash");

        let Some(kind) = self.classifier.classify(topic) else {
            debug!(topic = %topic, "Ignoring unknown event signature");
            return Ok(());
        };

        match DecodedLog::decode(kind, &log) {
            Ok(DecodedLog::Pawn(event)) => {
                self.handler.handle(event).await?;
            }
            Ok(DecodedLog::Notice(notice)) => {
                info!(kind = ?kind, notice = %notice, "Contract notice");
            }
            Err(e) => {
                warn!(
                    kind = ?kind,
                    transaction_hash = ?log.transaction_hash,
                    error = %e,
                    "Failed to decode recognised event"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::contracts::PawningShop;
    use crate::events::event_feeds;
    use crate::events::types::tests::rpc_log;
    use crate::processors::pawn_handler::tests::{BackendCall, FixedReader, RecordingBackend};
    use alloy::primitives::{Address, B256, LogData, U256, address};
    use alloy::sol_types::SolEvent;
    use pawnwatch_sdk::objects::PawnStatus;
    use std::time::Duration;

    const SHOP: Address = address!("0x00000000000000000000000000000000000000aa");
    const LENDER: Address = address!("0x1111111111111111111111111111111111111111");
    const BORROWER: Address = address!("0x2222222222222222222222222222222222222222");

    fn dispatcher(
        backend: RecordingBackend,
        reader: FixedReader,
        feeds: EventFeeds,
    ) -> (
        EventDispatcher<RecordingBackend, FixedReader>,
        watch::Sender<bool>,
    ) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handler = PawnEventHandler::new(backend, reader);
        (EventDispatcher::new(handler, feeds, shutdown_rx), shutdown_tx)
    }

    #[tokio::test]
    async fn test_unknown_signature_makes_no_calls() {
        let backend = RecordingBackend::default();
        let reader = FixedReader::default();
        let (senders, feeds) = event_feeds();
        let (dispatcher, _shutdown_tx) = dispatcher(backend.clone(), reader.clone(), feeds);

        let unknown = LogData::new_unchecked(vec![B256::repeat_byte(0x42)], Default::default());
        senders.logs.send(rpc_log(SHOP, unknown)).await.unwrap();
        senders
            .logs
            .send(rpc_log(SHOP, LogData::default()))
            .await
            .unwrap();
        drop(senders);

        let result = dispatcher.run().await;
        assert!(matches!(result, Err(DispatchError::FeedsClosed)));
        assert!(backend.calls().is_empty());
        assert!(reader.reads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pawn_created_log_is_inserted_and_notified() {
        let backend = RecordingBackend::default();
        let reader = FixedReader::default();
        let (senders, feeds) = event_feeds();
        let (dispatcher, _shutdown_tx) = dispatcher(backend.clone(), reader.clone(), feeds);

        let created = PawningShop::PawnCreated {
            pawnId: U256::from(21u64),
            creator: BORROWER,
        };
        senders
            .logs
            .send(rpc_log(SHOP, created.encode_log_data()))
            .await
            .unwrap();
        drop(senders);

        let _ = dispatcher.run().await;
        assert_eq!(*reader.reads.lock().unwrap(), vec![U256::from(21u64)]);

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], BackendCall::Insert(r) if r.pawn_id == "21"));
        let BackendCall::Notify(notification) = &calls[1] else {
            panic!("expected a notification, got {:?}", calls[1]);
        };
        assert_eq!(notification.code, "PawnCreated");
        assert_eq!(notification.message, "New pawn is created");
    }

    #[tokio::test]
    async fn test_typed_feeds_bypass_classification() {
        let backend = RecordingBackend::default();
        let (senders, feeds) = event_feeds();
        let (dispatcher, _shutdown_tx) = dispatcher(backend.clone(), FixedReader::default(), feeds);

        senders
            .repaid
            .send(PawningShop::PawnRepaid {
                pawnId: U256::from(5u64),
                bidId: U256::from(6u64),
                lender: LENDER,
                borrower: BORROWER,
            })
            .await
            .unwrap();
        senders
            .liquidated
            .send(PawningShop::PawnLiquidated {
                pawnId: U256::from(7u64),
                bidId: U256::from(8u64),
                lender: LENDER,
                borrower: BORROWER,
            })
            .await
            .unwrap();
        drop(senders);

        let _ = dispatcher.run().await;

        let mut updates: Vec<(String, PawnStatus, String)> = backend
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Update {
                    pawn_id,
                    status,
                    payload,
                } => Some((pawn_id, status, payload)),
                _ => None,
            })
            .collect();
        updates.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            updates,
            vec![
                ("5".to_string(), PawnStatus::Repaid, String::new()),
                ("7".to_string(), PawnStatus::Liquidated, String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_notice_events_make_no_calls() {
        let backend = RecordingBackend::default();
        let (senders, feeds) = event_feeds();
        let (dispatcher, _shutdown_tx) = dispatcher(backend.clone(), FixedReader::default(), feeds);

        let added = PawningShop::WhiteListAdded {
            smartContract: LENDER,
        };
        let bid = PawningShop::BidCreated {
            bidId: U256::from(1u64),
            pawnId: U256::from(2u64),
            creator: LENDER,
        };
        senders
            .logs
            .send(rpc_log(SHOP, added.encode_log_data()))
            .await
            .unwrap();
        senders
            .logs
            .send(rpc_log(SHOP, bid.encode_log_data()))
            .await
            .unwrap();
        drop(senders);

        let _ = dispatcher.run().await;
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_subscription_error_stops_dispatcher() {
        let backend = RecordingBackend::default();
        let (senders, feeds) = event_feeds();
        let (dispatcher, _shutdown_tx) = dispatcher(backend.clone(), FixedReader::default(), feeds);

        senders
            .liquidated_errors
            .send(SubscriptionError::new(Feed::PawnLiquidated, "connection reset"))
            .await
            .unwrap();

        let result = dispatcher.run().await;
        match result {
            Err(DispatchError::Subscription { feed, message }) => {
                assert_eq!(feed, Feed::PawnLiquidated);
                assert_eq!(message, "connection reset");
            }
            other => panic!("expected subscription error, got {other:?}"),
        }
        assert!(backend.calls().is_empty());
        // Senders are still alive: the loop ended because of the error.
        drop(senders);
    }

    #[tokio::test]
    async fn test_chain_read_failure_stops_dispatcher() {
        let backend = RecordingBackend::default();
        let reader = FixedReader {
            fail: true,
            ..Default::default()
        };
        let (senders, feeds) = event_feeds();
        let (dispatcher, _shutdown_tx) = dispatcher(backend.clone(), reader, feeds);

        let created = PawningShop::PawnCreated {
            pawnId: U256::from(1u64),
            creator: BORROWER,
        };
        senders
            .logs
            .send(rpc_log(SHOP, created.encode_log_data()))
            .await
            .unwrap();

        let result = dispatcher.run().await;
        assert!(matches!(
            result,
            Err(DispatchError::Handler(HandlerError::ChainRead { .. }))
        ));
        assert!(backend.calls().is_empty());
        drop(senders);
    }

    #[tokio::test]
    async fn test_closed_feeds_end_the_run() {
        let (senders, feeds) = event_feeds();
        let (dispatcher, _shutdown_tx) =
            dispatcher(RecordingBackend::default(), FixedReader::default(), feeds);
        drop(senders);

        let result = tokio::time::timeout(Duration::from_secs(5), dispatcher.run())
            .await
            .expect("dispatcher must return once every feed is closed");
        assert!(matches!(result, Err(DispatchError::FeedsClosed)));
    }

    #[tokio::test]
    async fn test_error_reported_before_close_wins_over_feeds_closed() {
        let (senders, feeds) = event_feeds();
        let (dispatcher, _shutdown_tx) =
            dispatcher(RecordingBackend::default(), FixedReader::default(), feeds);

        senders
            .log_errors
            .send(SubscriptionError::new(Feed::Logs, "subscription stream ended"))
            .await
            .unwrap();
        drop(senders);

        let result = tokio::time::timeout(Duration::from_secs(5), dispatcher.run())
            .await
            .unwrap();
        assert!(matches!(
            result,
            Err(DispatchError::Subscription {
                feed: Feed::Logs,
                ..
            })
        ));
    }

    /// Queue one data event and an error on the same feed, then run.
    async fn run_with_error_on(feed: Feed) -> (Result<(), DispatchError>, RecordingBackend) {
        let backend = RecordingBackend::default();
        let (senders, feeds) = event_feeds();
        let (dispatcher, _shutdown_tx) = dispatcher(backend.clone(), FixedReader::default(), feeds);

        let error = SubscriptionError::new(feed, "connection reset");
        match feed {
            Feed::Logs => {
                let created = PawningShop::PawnCreated {
                    pawnId: U256::from(1u64),
                    creator: BORROWER,
                };
                senders
                    .logs
                    .send(rpc_log(SHOP, created.encode_log_data()))
                    .await
                    .unwrap();
                senders.log_errors.send(error).await.unwrap();
            }
            Feed::PawnRepaid => {
                senders
                    .repaid
                    .send(PawningShop::PawnRepaid {
                        pawnId: U256::from(2u64),
                        bidId: U256::from(3u64),
                        lender: LENDER,
                        borrower: BORROWER,
                    })
                    .await
                    .unwrap();
                senders.repaid_errors.send(error).await.unwrap();
            }
            Feed::PawnLiquidated => {
                senders
                    .liquidated
                    .send(PawningShop::PawnLiquidated {
                        pawnId: U256::from(4u64),
                        bidId: U256::from(5u64),
                        lender: LENDER,
                        borrower: BORROWER,
                    })
                    .await
                    .unwrap();
                senders.liquidated_errors.send(error).await.unwrap();
            }
        }

        let result = tokio::time::timeout(Duration::from_secs(5), dispatcher.run())
            .await
            .unwrap();
        drop(senders);
        (result, backend)
    }

    #[tokio::test]
    async fn test_error_on_any_feed_stops_before_queued_events() {
        for feed in [Feed::Logs, Feed::PawnRepaid, Feed::PawnLiquidated] {
            let (result, backend) = run_with_error_on(feed).await;
            match result {
                Err(DispatchError::Subscription {
                    feed: failed,
                    message,
                }) => {
                    assert_eq!(failed, feed);
                    assert_eq!(message, "connection reset");
                }
                other => panic!("expected subscription error on {feed}, got {other:?}"),
            }
            assert!(
                backend.calls().is_empty(),
                "{feed}: no event may be handled after an error"
            );
        }
    }

    #[tokio::test]
    async fn test_shutdown_signal_returns_ok() {
        let (senders, feeds) = event_feeds();
        let (dispatcher, shutdown_tx) =
            dispatcher(RecordingBackend::default(), FixedReader::default(), feeds);

        shutdown_tx.send(true).unwrap();
        assert!(dispatcher.run().await.is_ok());
        drop(senders);
    }
}
