//! Request signing for the pawn backend.
//!
//! Every request body sent by the listener is signed with HMAC-SHA256 over
//! `"{timestamp}.{json_body}"` using the backend API secret. The header
//! wire format is:
//!
//! ```text
//! Pawnwatch-Signature: {unix_timestamp}.{base64_signature}
//! ```
//!
//! The backend verifies the signature with [`SignedObject::verify`] (or an
//! equivalent implementation) and rejects requests older than
//! [`MAX_SIGNATURE_AGE`].
//!
//! The listener only signs. [`SignedObject::from_header_and_body`],
//! [`SignedObject::verify`] and [`check_timestamp`] are provided for the
//! receiving backend.

/// Header name for the HMAC signature.
pub const SIGNATURE_HEADER: &str = "Pawnwatch-Signature";

/// Header name identifying the calling listener.
pub const API_KEY_HEADER: &str = "Pawnwatch-Api-Key";

/// Maximum allowed age of a signature (in seconds).
pub const MAX_SIGNATURE_AGE: i64 = 5 * 60;

/// Marker trait for request bodies that can be signed.
pub trait Signature: for<'de> serde::Deserialize<'de> + serde::Serialize {}

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid header format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("signature expired")]
    Expired,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// A signed request body carrying its typed payload, timestamp, raw JSON,
/// and HMAC-SHA256 signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedObject<T: Signature> {
    pub body: T,
    pub timestamp: i64,
    pub json: String,
    pub signature: Box<[u8]>,
}

impl<T: Signature> SignedObject<T> {
    /// Serialize `body`, sign it with the current timestamp and return the
    /// assembled object.
    pub fn new(body: T, key: &[u8]) -> Result<Self, serde_json::Error> {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        Self::new_at(body, key, now)
    }

    fn new_at(body: T, key: &[u8], timestamp: i64) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(&body)?;
        let signature = hmac(key, format!("{timestamp}.{json}").as_bytes());
        Ok(Self {
            body,
            timestamp,
            json,
            signature,
        })
    }

    /// Rebuild a [`SignedObject`] from a `Pawnwatch-Signature` header value
    /// and the raw JSON body.
    ///
    /// This does **not** check the HMAC; call [`verify`](Self::verify).
    pub fn from_header_and_body(
        header_value: &str,
        body_json: String,
    ) -> Result<Self, SignatureError> {
        let (timestamp, signature) = parse_signature_header(header_value)?;
        let body: T = serde_json::from_str(&body_json)?;
        Ok(Self {
            body,
            timestamp,
            json: body_json,
            signature,
        })
    }

    /// Verify the HMAC and timestamp freshness, returning the payload.
    pub fn verify(self, key: &[u8]) -> Result<T, SignatureError> {
        let data = format!("{}.{}", self.timestamp, self.json);
        ring::hmac::verify(
            &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
            data.as_bytes(),
            self.signature.as_ref(),
        )?;
        check_timestamp(self.timestamp)?;
        Ok(self.body)
    }

    /// Format the full `Pawnwatch-Signature` header value.
    pub fn to_header(&self) -> String {
        format_signature_header(self.timestamp, &self.signature)
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Box<[u8]> {
    let tag = ring::hmac::sign(&ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key), data);
    tag.as_ref().to_owned().into_boxed_slice()
}

/// Parse a `{timestamp}.{base64}` header value.
pub fn parse_signature_header(value: &str) -> Result<(i64, Box<[u8]>), SignatureError> {
    let (timestamp, encoded) = value.split_once('.').ok_or(SignatureError::InvalidFormat)?;
    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidFormat)?;
    let signature_bytes = fast32::base64::RFC4648_NOPAD
        .decode_str(encoded)
        .map_err(|_| SignatureError::InvalidBase64)?
        .into_boxed_slice();
    Ok((timestamp, signature_bytes))
}

/// Format a `{timestamp}.{base64}` header value from its parts.
pub fn format_signature_header(timestamp: i64, signature: &[u8]) -> String {
    format!(
        "{}.{}",
        timestamp,
        fast32::base64::RFC4648_NOPAD.encode(signature)
    )
}

/// Check that a signature timestamp is within [`MAX_SIGNATURE_AGE`].
pub fn check_timestamp(timestamp: i64) -> Result<(), SignatureError> {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    if now - timestamp > MAX_SIGNATURE_AGE {
        return Err(SignatureError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{PawnStatus, UpdatePawnRequest};

    fn request() -> UpdatePawnRequest {
        UpdatePawnRequest {
            status: PawnStatus::Repaid,
            payload: String::new(),
        }
    }

    #[test]
    fn test_signed_body_verifies_through_header() {
        let signed = SignedObject::new(request(), b"backend-secret").unwrap();
        let header = signed.to_header();

        let parsed =
            SignedObject::<UpdatePawnRequest>::from_header_and_body(&header, signed.json.clone())
                .unwrap();
        let body = parsed.verify(b"backend-secret").unwrap();
        assert_eq!(body, request());
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let signed = SignedObject::new(request(), b"backend-secret").unwrap();
        let result = signed.verify(b"other-secret");
        assert!(matches!(result, Err(SignatureError::SignatureMismatch)));
    }

    #[test]
    fn test_stale_signature_is_rejected() {
        let stale = time::OffsetDateTime::now_utc().unix_timestamp() - MAX_SIGNATURE_AGE - 10;
        let signed = SignedObject::new_at(request(), b"backend-secret", stale).unwrap();
        assert!(matches!(
            signed.verify(b"backend-secret"),
            Err(SignatureError::Expired)
        ));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            parse_signature_header("no-dot-here"),
            Err(SignatureError::InvalidFormat)
        ));
        assert!(matches!(
            parse_signature_header("abc.AAAA"),
            Err(SignatureError::InvalidFormat)
        ));
        assert!(matches!(
            parse_signature_header("1700000000.!!!"),
            Err(SignatureError::InvalidBase64)
        ));
    }
}
