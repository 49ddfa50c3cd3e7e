//! Notification payload sent to the backend's notification sink.

use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// A user-facing notification about a pawn lifecycle change.
///
/// `payload` carries the raw response body of the persist call that
/// preceded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub code: String,
    pub pawn_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrower: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_id: Option<String>,
    pub payload: String,
}

impl Signature for Notification {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_parties_are_omitted() {
        let notification = Notification {
            message: "A pawn is cancelled".to_string(),
            code: "PawnCancelled".to_string(),
            pawn_id: "3".to_string(),
            borrower: Some("0x01".to_string()),
            lender: None,
            bid_id: None,
            payload: "{}".to_string(),
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["pawnId"], "3");
        assert_eq!(value["borrower"], "0x01");
        assert!(value.get("lender").is_none());
        assert!(value.get("bidId").is_none());
    }
}
