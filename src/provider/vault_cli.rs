//! # Vault CLI Backend
//!
//! Reads secrets by running `vault read -format=json <path>`.
//!
//! Authentication is whatever the local `vault` binary is already configured
//! with (`VAULT_ADDR`, token helper, etc.).

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{parse_read_response, FetchError, SecretFetcher};
use crate::constants::VAULT_BINARY;
use crate::paths::SecretPath;
use crate::reconciler::SecretMap;

/// Fetches secrets through the `vault` command-line client
#[derive(Debug, Clone)]
pub struct VaultCliFetcher {
    binary: String,
}

impl Default for VaultCliFetcher {
    fn default() -> Self {
        Self::new(VAULT_BINARY)
    }
}

impl VaultCliFetcher {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl SecretFetcher for VaultCliFetcher {
    async fn fetch(&self, path: &SecretPath) -> Result<SecretMap, FetchError> {
        info!("Running {} read on path: {}", self.binary, path);

        let output = Command::new(&self.binary)
            .arg("read")
            .arg("-format=json")
            .arg(path.as_str())
            .output()
            .await
            .map_err(|source| FetchError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(FetchError::CommandFailed {
                binary: self.binary.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let secrets = parse_read_response(&stdout)?;
        debug!("Read {} keys from {}", secrets.len(), path);
        Ok(secrets)
    }
}
