//! HTTP clients for the pawn backend.
//!
//! Gated behind the `client` cargo feature.

mod notify;
mod pawn;

pub use notify::NotifyClient;
pub use pawn::PawnClient;

use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::signature::{API_KEY_HEADER, SIGNATURE_HEADER, Signature, SignedObject};

/// Errors produced by the backend HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Request body could not be serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Credentials attached to every backend request.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Sent verbatim in the `Pawnwatch-Api-Key` header.
    pub api_key: String,
    /// HMAC key for body signing.
    pub api_secret: Vec<u8>,
}

/// Both backend APIs behind one handle, sharing a connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    pub pawn: PawnClient,
    pub notify: NotifyClient,
}

impl BackendClient {
    /// Create clients for `base_url` using a default `reqwest::Client`.
    pub fn new(base_url: Url, credentials: Credentials) -> Self {
        Self::with_http_client(base_url, credentials, Client::new())
    }

    /// Create clients sharing a caller-configured `reqwest::Client` (e.g.
    /// with a request timeout).
    ///
    /// Endpoint paths are resolved under `base_url`, so a path prefix such
    /// as `https://host/backend` is kept.
    pub fn with_http_client(base_url: Url, credentials: Credentials, http: Client) -> Self {
        let inner = SignedSender {
            http,
            base_url: as_directory(base_url),
            credentials,
        };
        Self {
            pawn: PawnClient::from_sender(inner.clone()),
            notify: NotifyClient::from_sender(inner),
        }
    }
}

/// Sends signed JSON bodies and returns the raw response text.
#[derive(Debug, Clone)]
struct SignedSender {
    http: Client,
    base_url: Url,
    credentials: Credentials,
}

impl SignedSender {
    async fn send<T: Signature>(
        &self,
        method: Method,
        path: &str,
        body: T,
    ) -> Result<String, ClientError> {
        let signed = SignedObject::new(body, &self.credentials.api_secret)?;
        let url = self.base_url.join(path)?;

        let resp = self
            .http
            .request(method, url)
            .header(SIGNATURE_HEADER, signed.to_header())
            .header(API_KEY_HEADER, &self.credentials.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(signed.json)
            .send()
            .await?;

        read_body(resp).await
    }
}

/// Ensure the path ends with `/` so that joining appends rather than
/// replacing the last segment.
fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

async fn read_body(resp: reqwest::Response) -> Result<String, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    Ok(resp.text().await?)
}
