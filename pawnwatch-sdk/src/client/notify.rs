//! Notification sink client.

use reqwest::Method;

use super::{ClientError, SignedSender};
use crate::objects::Notification;

/// Typed client for the backend's notification sink.
#[derive(Debug, Clone)]
pub struct NotifyClient {
    sender: SignedSender,
}

impl NotifyClient {
    pub(super) fn from_sender(sender: SignedSender) -> Self {
        Self { sender }
    }

    /// `POST /api/v1/notifications` – deliver one notification.
    pub async fn send_notification(
        &self,
        notification: Notification,
    ) -> Result<String, ClientError> {
        self.sender
            .send(Method::POST, "api/v1/notifications", notification)
            .await
    }
}
