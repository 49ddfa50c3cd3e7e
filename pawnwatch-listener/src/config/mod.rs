//! Configuration module for pawnwatch-listener.
//!
//! Handles loading configuration from the TOML file, CLI arguments,
//! and environment variables, and validates it into a [`ListenerConfig`].

pub mod file;

use crate::config::file::FileConfig;
use alloy::primitives::Address;
use pawnwatch_core::config::{BackendConfig, ListenerConfig, NetworkConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable holding the backend signing secret.
pub const API_SECRET_ENV: &str = "BACKEND_API_SECRET";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("BACKEND_API_SECRET environment variable not set")]
    MissingApiSecret,
}

/// Values taken from the command line or environment, applied on top of
/// the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub contract_address: Option<String>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    overrides: Overrides,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    /// Load and validate the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI / environment overrides
    /// 3. Read the signing secret from the environment
    /// 4. Validate every field
    pub fn load(&self) -> Result<ListenerConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let file_config: FileConfig = toml::from_str(&config_content)?;
        self.resolve(file_config, get_api_secret()?)
    }

    fn resolve(
        &self,
        mut file_config: FileConfig,
        api_secret: String,
    ) -> Result<ListenerConfig, ConfigError> {
        if let Some(endpoint) = &self.overrides.endpoint {
            file_config.network.endpoint = Some(endpoint.clone());
        }
        if let Some(contract) = &self.overrides.contract_address {
            file_config.network.contract_address = Some(contract.clone());
        }

        let endpoint = file_config
            .network
            .endpoint
            .as_deref()
            .ok_or_else(|| validation("network.endpoint is not set"))?;
        let contract = file_config
            .network
            .contract_address
            .as_deref()
            .ok_or_else(|| validation("network.contract_address is not set"))?;

        let network = NetworkConfig {
            endpoint: parse_endpoint(endpoint)?,
            contract_address: parse_contract_address(contract)?,
        };

        let backend = file_config.backend;
        if backend.api_key.is_empty() {
            return Err(validation("backend.api_key is empty"));
        }
        if backend.timeout_secs == 0 {
            return Err(validation("backend.timeout_secs must be greater than 0"));
        }
        let base_url = Url::parse(&backend.base_url).map_err(|e| {
            validation(format!("invalid backend.base_url {:?}: {e}", backend.base_url))
        })?;

        Ok(ListenerConfig {
            network,
            backend: BackendConfig {
                base_url,
                api_key: backend.api_key,
                api_secret: api_secret.into_bytes().into_boxed_slice(),
                timeout: Duration::from_secs(backend.timeout_secs),
            },
        })
    }
}

fn validation(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| validation(format!("invalid network.endpoint {value:?}: {e}")))?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(validation(format!(
            "network.endpoint must be a ws:// or wss:// URL, got {other}://"
        ))),
    }
}

fn parse_contract_address(value: &str) -> Result<Address, ConfigError> {
    value
        .parse()
        .map_err(|e| validation(format!("invalid network.contract_address {value:?}: {e}")))
}

/// Get the backend signing secret from the environment.
pub fn get_api_secret() -> Result<String, ConfigError> {
    match std::env::var(API_SECRET_ENV) {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ => Err(ConfigError::MissingApiSecret),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::{BackendConfig as FileBackend, NetworkConfig as FileNetwork};
    use alloy::primitives::address;

    const CONTRACT: &str = "0x00000000000000000000000000000000000000aa";

    fn file_config(endpoint: &str, contract: &str) -> FileConfig {
        FileConfig {
            network: FileNetwork {
                endpoint: Some(endpoint.to_string()),
                contract_address: Some(contract.to_string()),
            },
            backend: FileBackend {
                base_url: "https://api.example.com".to_string(),
                api_key: "listener".to_string(),
                timeout_secs: 30,
            },
        }
    }

    fn loader(overrides: Overrides) -> ConfigLoader {
        ConfigLoader::new("./pawnwatch.toml", overrides)
    }

    #[test]
    fn test_valid_config_resolves() {
        let config = loader(Overrides::default())
            .resolve(
                file_config("wss://node.example/ws", CONTRACT),
                "secret".to_string(),
            )
            .unwrap();

        assert_eq!(config.network.endpoint.as_str(), "wss://node.example/ws");
        assert_eq!(
            config.network.contract_address,
            address!("0x00000000000000000000000000000000000000aa")
        );
        assert_eq!(&*config.backend.api_secret, b"secret");
        assert_eq!(config.backend.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_http_endpoint_rejected() {
        let result = loader(Overrides::default()).resolve(
            file_config("https://node.example/rpc", CONTRACT),
            "secret".to_string(),
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_bad_contract_address_rejected() {
        let result = loader(Overrides::default()).resolve(
            file_config("ws://127.0.0.1:8546", "0x1234"),
            "secret".to_string(),
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = file_config("ws://127.0.0.1:8546", CONTRACT);
        config.backend.timeout_secs = 0;
        let result = loader(Overrides::default()).resolve(config, "secret".to_string());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let overrides = Overrides {
            endpoint: Some("ws://127.0.0.1:8546".to_string()),
            contract_address: Some("0x00000000000000000000000000000000000000bb".to_string()),
        };
        let config = loader(overrides)
            .resolve(
                file_config("https://ignored.example", "not-an-address"),
                "secret".to_string(),
            )
            .unwrap();

        assert_eq!(config.network.endpoint.as_str(), "ws://127.0.0.1:8546/");
        assert_eq!(
            config.network.contract_address,
            address!("0x00000000000000000000000000000000000000bb")
        );
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let mut config = file_config("ws://127.0.0.1:8546", CONTRACT);
        config.network.endpoint = None;
        let result = loader(Overrides::default()).resolve(config, "secret".to_string());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
