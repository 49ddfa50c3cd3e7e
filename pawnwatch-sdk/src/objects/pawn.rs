//! Pawn persistence payloads.

use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// Lifecycle state of a pawn as mirrored by the backend.
///
/// Serialized as the integer code used by the pawning shop contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PawnStatus {
    Created,
    Cancelled,
    Deal,
    Liquidated,
    Repaid,
}

impl PawnStatus {
    /// Integer code of this status.
    pub const fn code(self) -> u8 {
        match self {
            PawnStatus::Created => 0,
            PawnStatus::Cancelled => 1,
            PawnStatus::Deal => 2,
            PawnStatus::Liquidated => 3,
            PawnStatus::Repaid => 4,
        }
    }
}

impl From<PawnStatus> for u8 {
    fn from(value: PawnStatus) -> Self {
        value.code()
    }
}

/// A status code outside the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown pawn status code {0}")]
pub struct UnknownPawnStatus(pub u8);

impl TryFrom<u8> for PawnStatus {
    type Error = UnknownPawnStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PawnStatus::Created),
            1 => Ok(PawnStatus::Cancelled),
            2 => Ok(PawnStatus::Deal),
            3 => Ok(PawnStatus::Liquidated),
            4 => Ok(PawnStatus::Repaid),
            other => Err(UnknownPawnStatus(other)),
        }
    }
}

impl std::fmt::Display for PawnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PawnStatus::Created => write!(f, "created"),
            PawnStatus::Cancelled => write!(f, "cancelled"),
            PawnStatus::Deal => write!(f, "deal"),
            PawnStatus::Liquidated => write!(f, "liquidated"),
            PawnStatus::Repaid => write!(f, "repaid"),
        }
    }
}

/// Body of `POST /api/v1/pawns`.
///
/// The status is the raw code read from the contract; the backend owns its
/// interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertPawnRequest {
    pub pawn_id: String,
    pub creator: String,
    pub contract_address: String,
    pub token_id: String,
    pub status: u8,
}

impl Signature for InsertPawnRequest {}

/// Body of `PUT /api/v1/pawns/{pawn_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePawnRequest {
    pub status: PawnStatus,
    pub payload: String,
}

impl Signature for UpdatePawnRequest {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_as_code() {
        let body = UpdatePawnRequest {
            status: PawnStatus::Liquidated,
            payload: String::new(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"status":3,"payload":""}"#);
    }

    #[test]
    fn test_status_codes_round_trip() {
        for code in 0u8..=4 {
            let status = PawnStatus::try_from(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(PawnStatus::try_from(5), Err(UnknownPawnStatus(5)));
        assert!(serde_json::from_str::<PawnStatus>("9").is_err());
    }

    #[test]
    fn test_insert_request_field_names() {
        let body = InsertPawnRequest {
            pawn_id: "7".to_string(),
            creator: "0xabc".to_string(),
            contract_address: "0xdef".to_string(),
            token_id: "42".to_string(),
            status: 0,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["pawnId"], "7");
        assert_eq!(value["contractAddress"], "0xdef");
        assert_eq!(value["tokenId"], "42");
        assert_eq!(value["status"], 0);
    }
}
