//! Backend API configuration.

use std::time::Duration;

use pawnwatch_sdk::client::{BackendClient, Credentials};
use url::Url;

/// Default timeout for each outbound backend request.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend API location and credentials.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL; endpoint paths are joined onto it.
    pub base_url: Url,
    /// Sent in the `Pawnwatch-Api-Key` header.
    pub api_key: String,
    /// HMAC key for request signing.
    pub api_secret: Box<[u8]>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl BackendConfig {
    /// Build a [`BackendClient`] whose requests honour [`Self::timeout`].
    pub fn build_client(&self) -> Result<BackendClient, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        let credentials = Credentials {
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.to_vec(),
        };
        Ok(BackendClient::with_http_client(
            self.base_url.clone(),
            credentials,
            http,
        ))
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
