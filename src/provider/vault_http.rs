//! # Vault HTTP Backend
//!
//! Reads secrets with a `GET {VAULT_ADDR}/v1/{path}` request authenticated by
//! the `X-Vault-Token` header. Useful on build agents without the `vault`
//! binary installed.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::{parse_read_response, FetchError, SecretFetcher};
use crate::paths::SecretPath;
use crate::reconciler::SecretMap;

/// Fetches secrets from the Vault HTTP API
pub struct VaultHttpFetcher {
    http_client: Client,
    address: String,
    token: String,
}

impl std::fmt::Debug for VaultHttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultHttpFetcher")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl VaultHttpFetcher {
    /// Create a client for the Vault server at `address`
    #[allow(
        clippy::missing_errors_doc,
        reason = "Fails only when the TLS backend cannot be initialised"
    )]
    pub fn new(
        address: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            address: address.into(),
            token: token.into(),
        })
    }

    fn url(&self, path: &SecretPath) -> String {
        format!("{}/{}", self.address.trim_end_matches('/'), path.http_path())
    }
}

#[async_trait]
impl SecretFetcher for VaultHttpFetcher {
    async fn fetch(&self, path: &SecretPath) -> Result<SecretMap, FetchError> {
        let url = self.url(path);
        info!("Reading secrets from {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("X-Vault-Token", &self.token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let secrets = parse_read_response(&body)?;
        debug!("Read {} keys from {}", secrets.len(), path);
        Ok(secrets)
    }
}
