//! Decoded event types.
//!
//! Events are immutable once decoded. They carry only what the contract
//! emitted; the handler re-reads the contract when more state is needed.

use alloy::primitives::{Address, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use pawnwatch_sdk::objects::{Notification, PawnStatus};

use crate::classifier::LogKind;
use crate::contracts::PawningShop;

/// A pawn lifecycle event that is persisted and notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PawnEvent {
    Created {
        pawn_id: U256,
    },
    Cancelled {
        pawn_id: U256,
        borrower: Address,
    },
    Repaid {
        pawn_id: U256,
        bid_id: U256,
        lender: Address,
        borrower: Address,
    },
    Liquidated {
        pawn_id: U256,
        bid_id: U256,
        lender: Address,
        borrower: Address,
    },
    BidAccepted {
        pawn_id: U256,
        bid_id: U256,
        lender: Address,
        borrower: Address,
    },
}

impl PawnEvent {
    pub fn pawn_id(&self) -> U256 {
        match self {
            PawnEvent::Created { pawn_id }
            | PawnEvent::Cancelled { pawn_id, .. }
            | PawnEvent::Repaid { pawn_id, .. }
            | PawnEvent::Liquidated { pawn_id, .. }
            | PawnEvent::BidAccepted { pawn_id, .. } => *pawn_id,
        }
    }

    /// Stable event code sent with the notification.
    pub const fn code(&self) -> &'static str {
        match self {
            PawnEvent::Created { .. } => "PawnCreated",
            PawnEvent::Cancelled { .. } => "PawnCancelled",
            PawnEvent::Repaid { .. } => "PawnRepaid",
            PawnEvent::Liquidated { .. } => "PawnLiquidated",
            PawnEvent::BidAccepted { .. } => "BidAccepted",
        }
    }

    /// Human-readable notification message.
    pub const fn message(&self) -> &'static str {
        match self {
            PawnEvent::Created { .. } => "New pawn is created",
            PawnEvent::Cancelled { .. } => "A pawn is cancelled",
            PawnEvent::Repaid { .. } => "A pawn is repaid",
            PawnEvent::Liquidated { .. } => "A pawn is liquidated",
            PawnEvent::BidAccepted { .. } => "A bid is accepted",
        }
    }

    /// Status the backend record moves to.
    pub const fn status(&self) -> PawnStatus {
        match self {
            PawnEvent::Created { .. } => PawnStatus::Created,
            PawnEvent::Cancelled { .. } => PawnStatus::Cancelled,
            PawnEvent::Repaid { .. } => PawnStatus::Repaid,
            PawnEvent::Liquidated { .. } => PawnStatus::Liquidated,
            PawnEvent::BidAccepted { .. } => PawnStatus::Deal,
        }
    }

    /// Build the notification for this event with the persist response as
    /// payload.
    ///
    /// `Created` carries no borrower on-chain; the handler fills it in from
    /// the contract read.
    pub fn notification(&self, payload: String) -> Notification {
        let mut notification = Notification {
            message: self.message().to_string(),
            code: self.code().to_string(),
            pawn_id: self.pawn_id().to_string(),
            borrower: None,
            lender: None,
            bid_id: None,
            payload,
        };
        match self {
            PawnEvent::Created { .. } => {}
            PawnEvent::Cancelled { borrower, .. } => {
                notification.borrower = Some(borrower.to_string());
            }
            PawnEvent::Repaid {
                bid_id,
                lender,
                borrower,
                ..
            }
            | PawnEvent::Liquidated {
                bid_id,
                lender,
                borrower,
                ..
            }
            | PawnEvent::BidAccepted {
                bid_id,
                lender,
                borrower,
                ..
            } => {
                notification.bid_id = Some(bid_id.to_string());
                notification.lender = Some(lender.to_string());
                notification.borrower = Some(borrower.to_string());
            }
        }
        notification
    }
}

impl From<PawningShop::PawnCreated> for PawnEvent {
    fn from(event: PawningShop::PawnCreated) -> Self {
        PawnEvent::Created {
            pawn_id: event.pawnId,
        }
    }
}

impl From<PawningShop::PawnCancelled> for PawnEvent {
    fn from(event: PawningShop::PawnCancelled) -> Self {
        PawnEvent::Cancelled {
            pawn_id: event.pawnId,
            borrower: event.borrower,
        }
    }
}

impl From<PawningShop::PawnRepaid> for PawnEvent {
    fn from(event: PawningShop::PawnRepaid) -> Self {
        PawnEvent::Repaid {
            pawn_id: event.pawnId,
            bid_id: event.bidId,
            lender: event.lender,
            borrower: event.borrower,
        }
    }
}

impl From<PawningShop::PawnLiquidated> for PawnEvent {
    fn from(event: PawningShop::PawnLiquidated) -> Self {
        PawnEvent::Liquidated {
            pawn_id: event.pawnId,
            bid_id: event.bidId,
            lender: event.lender,
            borrower: event.borrower,
        }
    }
}

impl From<PawningShop::BidAccepted> for PawnEvent {
    fn from(event: PawningShop::BidAccepted) -> Self {
        PawnEvent::BidAccepted {
            pawn_id: event.pawnId,
            bid_id: event.bidId,
            lender: event.lender,
            borrower: event.borrower,
        }
    }
}

/// Recognised contract events that are only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractNotice {
    BidCreated {
        bid_id: U256,
        pawn_id: U256,
        creator: Address,
    },
    BidCancelled {
        bid_id: U256,
        pawn_id: U256,
    },
    WhiteListAdded {
        smart_contract: Address,
    },
    WhiteListRemoved {
        smart_contract: Address,
    },
}

impl std::fmt::Display for ContractNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractNotice::BidCreated {
                bid_id,
                pawn_id,
                creator,
            } => write!(f, "bid {bid_id} created on pawn {pawn_id} by {creator}"),
            ContractNotice::BidCancelled { bid_id, pawn_id } => {
                write!(f, "bid {bid_id} on pawn {pawn_id} cancelled")
            }
            ContractNotice::WhiteListAdded { smart_contract } => {
                write!(f, "{smart_contract} added to whitelist")
            }
            ContractNotice::WhiteListRemoved { smart_contract } => {
                write!(f, "{smart_contract} removed from whitelist")
            }
        }
    }
}

/// A raw log decoded according to its classified kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedLog {
    Pawn(PawnEvent),
    Notice(ContractNotice),
}

pub(crate) fn decode_event<E: SolEvent>(log: &Log) -> Result<E, alloy::sol_types::Error> {
    log.log_decode::<E>().map(|decoded| decoded.inner.data)
}

impl DecodedLog {
    /// Decode `log` with the ABI of `kind`.
    pub fn decode(kind: LogKind, log: &Log) -> Result<Self, alloy::sol_types::Error> {
        let decoded = match kind {
            LogKind::PawnCreated => {
                DecodedLog::Pawn(decode_event::<PawningShop::PawnCreated>(log)?.into())
            }
            LogKind::PawnCancelled => {
                DecodedLog::Pawn(decode_event::<PawningShop::PawnCancelled>(log)?.into())
            }
            LogKind::BidAccepted => {
                DecodedLog::Pawn(decode_event::<PawningShop::BidAccepted>(log)?.into())
            }
            LogKind::BidCreated => {
                let event = decode_event::<PawningShop::BidCreated>(log)?;
                DecodedLog::Notice(ContractNotice::BidCreated {
                    bid_id: event.bidId,
                    pawn_id: event.pawnId,
                    creator: event.creator,
                })
            }
            LogKind::BidCancelled => {
                let event = decode_event::<PawningShop::BidCancelled>(log)?;
                DecodedLog::Notice(ContractNotice::BidCancelled {
                    bid_id: event.bidId,
                    pawn_id: event.pawnId,
                })
            }
            LogKind::WhiteListAdded => {
                let event = decode_event::<PawningShop::WhiteListAdded>(log)?;
                DecodedLog::Notice(ContractNotice::WhiteListAdded {
                    smart_contract: event.smartContract,
                })
            }
            LogKind::WhiteListRemoved => {
                let event = decode_event::<PawningShop::WhiteListRemoved>(log)?;
                DecodedLog::Notice(ContractNotice::WhiteListRemoved {
                    smart_contract: event.smartContract,
                })
            }
        };
        Ok(decoded)
    }
}
