//! Pawn persistence API client.

use reqwest::Method;

use super::{ClientError, SignedSender};
use crate::objects::{InsertPawnRequest, PawnStatus, UpdatePawnRequest};

/// Typed client for the backend's pawn records.
///
/// Every call returns the backend's raw response body on a 2xx status.
#[derive(Debug, Clone)]
pub struct PawnClient {
    sender: SignedSender,
}

impl PawnClient {
    pub(super) fn from_sender(sender: SignedSender) -> Self {
        Self { sender }
    }

    /// `POST /api/v1/pawns` – insert a newly created pawn.
    pub async fn insert_one(&self, request: InsertPawnRequest) -> Result<String, ClientError> {
        self.sender
            .send(Method::POST, "api/v1/pawns", request)
            .await
    }

    /// `PUT /api/v1/pawns/{pawn_id}` – set the status of an existing pawn.
    pub async fn update_one(
        &self,
        pawn_id: &str,
        status: PawnStatus,
        payload: impl Into<String>,
    ) -> Result<String, ClientError> {
        let path = format!("api/v1/pawns/{}", urlencoding::encode(pawn_id));
        let body = UpdatePawnRequest {
            status,
            payload: payload.into(),
        };
        self.sender.send(Method::PUT, &path, body).await
    }
}
