//! Common test utilities for sync integration tests
//!
//! Provides an in-memory secret fetcher and helpers for building configs that
//! point at a temporary env file.

#![allow(dead_code, reason = "Not every test binary uses every helper")]

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use vault_dotenv::config::BackendConfig;
use vault_dotenv::paths::{SecretPath, SecretPathBuilder};
use vault_dotenv::provider::{FetchError, SecretFetcher};
use vault_dotenv::{SecretMap, SyncConfig};

/// Fetcher returning a fixed map, or failing when built with [`StaticFetcher::failing`]
#[derive(Debug, Default)]
pub struct StaticFetcher {
    secrets: Option<SecretMap>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            secrets: Some(secret_map(pairs)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            secrets: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretFetcher for StaticFetcher {
    async fn fetch(&self, _path: &SecretPath) -> Result<SecretMap, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.secrets.clone().ok_or(FetchError::MissingData)
    }
}

pub fn secret_map(pairs: &[(&str, &str)]) -> SecretMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Config targeting `env_file` for service `svc`
pub fn config_for(env_file: &Path) -> SyncConfig {
    SyncConfig {
        service: "svc".to_string(),
        secret_path: test_path(),
        env_file: env_file.to_path_buf(),
        backend: BackendConfig::Cli {
            binary: "vault".to_string(),
        },
        dry_run: false,
    }
}

pub fn test_path() -> SecretPath {
    SecretPathBuilder::new()
        .service("svc")
        .build()
        .expect("valid test path")
}
