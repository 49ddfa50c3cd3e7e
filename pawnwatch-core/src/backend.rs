//! Seams between the handlers and their two collaborators: the backend HTTP
//! API and the contract read call.

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use async_trait::async_trait;
use pawnwatch_sdk::client::{BackendClient, ClientError};
use pawnwatch_sdk::objects::{InsertPawnRequest, Notification, PawnStatus};
use thiserror::Error;

use crate::contracts::PawningShop::PawningShopInstance;

/// Persistence and notification calls issued by the handlers.
///
/// Every call yields the backend's raw response body on success.
#[async_trait]
pub trait PawnBackend: Send + Sync {
    async fn insert_pawn(&self, request: InsertPawnRequest) -> Result<String, ClientError>;

    async fn update_pawn(
        &self,
        pawn_id: &str,
        status: PawnStatus,
        payload: &str,
    ) -> Result<String, ClientError>;

    async fn send_notification(&self, notification: Notification) -> Result<String, ClientError>;
}

#[async_trait]
impl PawnBackend for BackendClient {
    async fn insert_pawn(&self, request: InsertPawnRequest) -> Result<String, ClientError> {
        self.pawn.insert_one(request).await
    }

    async fn update_pawn(
        &self,
        pawn_id: &str,
        status: PawnStatus,
        payload: &str,
    ) -> Result<String, ClientError> {
        self.pawn.update_one(pawn_id, status, payload).await
    }

    async fn send_notification(&self, notification: Notification) -> Result<String, ClientError> {
        self.notify.send_notification(notification).await
    }
}

/// Pawn state as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainPawn {
    pub creator: Address,
    pub contract_address: Address,
    pub token_id: U256,
    pub status: u8,
}

/// Failure of the contract read call.
#[derive(Debug, Error)]
#[error("contract read failed: {0}")]
pub struct ReadError(String);

impl ReadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<alloy::contract::Error> for ReadError {
    fn from(value: alloy::contract::Error) -> Self {
        Self(value.to_string())
    }
}

/// Reads current pawn state back from the contract.
#[async_trait]
pub trait PawnReader: Send + Sync {
    async fn pawn(&self, pawn_id: U256) -> Result<OnChainPawn, ReadError>;
}

#[async_trait]
impl<P: Provider> PawnReader for PawningShopInstance<P> {
    async fn pawn(&self, pawn_id: U256) -> Result<OnChainPawn, ReadError> {
        let pawn = self.pawns(pawn_id).call().await?;
        Ok(OnChainPawn {
            creator: pawn.creator,
            contract_address: pawn.contractAddress,
            token_id: pawn.tokenId,
            status: pawn.status,
        })
    }
}
