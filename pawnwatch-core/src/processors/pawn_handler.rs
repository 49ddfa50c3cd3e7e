//! PawnEventHandler processor.
//!
//! For every pawn event the handler:
//! - persists it (insert for `Created`, status update otherwise)
//! - sends a notification carrying the persist response, only if the
//!   persist call succeeded
//!
//! Persist and notify failures are logged and swallowed; nothing is retried.
//! A failed contract read while handling `Created` is returned as an error.

use alloy::primitives::U256;
use pawnwatch_sdk::objects::InsertPawnRequest;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{PawnBackend, PawnReader, ReadError};
use crate::events::PawnEvent;

/// Errors that stop the listener.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The contract could not be read back for a created pawn.
    #[error("failed to read pawn {pawn_id} from contract: {source}")]
    ChainRead {
        pawn_id: U256,
        #[source]
        source: ReadError,
    },
}

/// What happened to an event that was handled without a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Persisted and notified.
    Notified,
    /// Persisted, but the notification was not accepted.
    NotifyFailed,
    /// Not persisted; no notification was attempted.
    PersistFailed,
}

/// Turns pawn events into backend calls.
pub struct PawnEventHandler<B, R> {
    backend: B,
    reader: R,
}

impl<B: PawnBackend, R: PawnReader> PawnEventHandler<B, R> {
    pub fn new(backend: B, reader: R) -> Self {
        Self { backend, reader }
    }

    /// Handle one event to completion.
    pub async fn handle(&self, event: PawnEvent) -> Result<HandleOutcome, HandlerError> {
        let code = event.code();
        let pawn_id = event.pawn_id().to_string();
        info!(code, pawn_id = %pawn_id, "Handling pawn event");

        let mut creator = None;
        let persisted = match &event {
            PawnEvent::Created { pawn_id: id } => {
                let pawn = self
                    .reader
                    .pawn(*id)
                    .await
                    .map_err(|source| HandlerError::ChainRead {
                        pawn_id: *id,
                        source,
                    })?;
                debug!(
                    pawn_id = %id,
                    creator = %pawn.creator,
                    contract_address = %pawn.contract_address,
                    token_id = %pawn.token_id,
                    status = pawn.status,
                    "Fetched pawn from contract"
                );
                creator = Some(pawn.creator);

                let request = InsertPawnRequest {
                    pawn_id: pawn_id.clone(),
                    creator: pawn.creator.to_string(),
                    contract_address: pawn.contract_address.to_string(),
                    token_id: pawn.token_id.to_string(),
                    status: pawn.status,
                };
                self.backend.insert_pawn(request).await
            }
            other => {
                self.backend
                    .update_pawn(&pawn_id, other.status(), "")
                    .await
            }
        };

        let body = match persisted {
            Ok(body) => {
                info!(code, pawn_id = %pawn_id, "Pawn event persisted");
                body
            }
            Err(e) => {
                warn!(
                    code,
                    pawn_id = %pawn_id,
                    error = %e,
                    "Failed to persist pawn event, notification skipped"
                );
                return Ok(HandleOutcome::PersistFailed);
            }
        };

        let mut notification = event.notification(body);
        if let Some(creator) = creator {
            notification.borrower = Some(creator.to_string());
        }

        match self.backend.send_notification(notification).await {
            Ok(_) => {
                info!(code, pawn_id = %pawn_id, "Notification sent");
                Ok(HandleOutcome::Notified)
            }
            Err(e) => {
                warn!(
                    code,
                    pawn_id = %pawn_id,
                    error = %e,
                    "Failed to send notification"
                );
                Ok(HandleOutcome::NotifyFailed)
            }
        }
    }
}
