//! # Configuration
//!
//! Resolves run settings from command-line overrides and environment variables.
//!
//! Precedence: command-line flag, then environment variable, then default.
//! Empty environment variables count as unset.

use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ENV_FILE, DEFAULT_FETCH_TIMEOUT_SECS, ENV_NAMESPACE, ENV_REGION, ENV_SERVICE,
    ENV_VAULT_ADDR, ENV_VAULT_TOKEN, VAULT_BINARY,
};
use crate::error::SyncError;
use crate::paths::{SecretPath, SecretPathBuilder};
use crate::provider::{SecretFetcher, VaultCliFetcher, VaultHttpFetcher};

/// How secrets are read from Vault
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Run the `vault` command-line client
    #[default]
    Cli,
    /// Call the Vault HTTP API directly (needs VAULT_ADDR and VAULT_TOKEN)
    Http,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub service: Option<String>,
    pub region: Option<String>,
    pub namespace: Option<String>,
    pub env_file: Option<PathBuf>,
    pub backend: Backend,
    pub vault_addr: Option<String>,
    pub timeout_secs: Option<u64>,
    pub dry_run: bool,
}

/// Resolved backend settings
#[derive(Clone)]
pub enum BackendConfig {
    Cli {
        binary: String,
    },
    Http {
        address: String,
        token: String,
        timeout: Duration,
    },
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendConfig::Cli { binary } => f.debug_struct("Cli").field("binary", binary).finish(),
            BackendConfig::Http {
                address, timeout, ..
            } => f
                .debug_struct("Http")
                .field("address", address)
                .field("timeout", timeout)
                .finish_non_exhaustive(),
        }
    }
}

/// Settings for one sync run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub service: String,
    pub secret_path: SecretPath,
    pub env_file: PathBuf,
    pub backend: BackendConfig,
    pub dry_run: bool,
}

impl SyncConfig {
    /// Resolve settings against the process environment
    #[allow(
        clippy::missing_errors_doc,
        reason = "Errors are the ConfigurationMissing/ConfigurationInvalid variants"
    )]
    pub fn from_env(overrides: Overrides) -> Result<Self, SyncError> {
        Self::resolve(overrides, |name| std::env::var(name).ok())
    }

    /// Resolve settings using `lookup` for environment variables
    #[allow(
        clippy::missing_errors_doc,
        reason = "Errors are the ConfigurationMissing/ConfigurationInvalid variants"
    )]
    pub fn resolve<F>(overrides: Overrides, lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let service = overrides
            .service
            .or_else(|| lookup(ENV_SERVICE))
            .ok_or_else(|| SyncError::ConfigurationMissing {
                variable: ENV_SERVICE.to_string(),
            })?;

        let mut builder = SecretPathBuilder::new().service(service.clone());
        if let Some(region) = overrides.region.or_else(|| lookup(ENV_REGION)) {
            builder = builder.region(region);
        }
        if let Some(namespace) = overrides.namespace.or_else(|| lookup(ENV_NAMESPACE)) {
            builder = builder.namespace(namespace);
        }
        let secret_path = builder.build()?;

        let backend = match overrides.backend {
            Backend::Cli => BackendConfig::Cli {
                binary: VAULT_BINARY.to_string(),
            },
            Backend::Http => {
                let address = overrides
                    .vault_addr
                    .or_else(|| lookup(ENV_VAULT_ADDR))
                    .ok_or_else(|| SyncError::ConfigurationMissing {
                        variable: ENV_VAULT_ADDR.to_string(),
                    })?;
                let token =
                    lookup(ENV_VAULT_TOKEN).ok_or_else(|| SyncError::ConfigurationMissing {
                        variable: ENV_VAULT_TOKEN.to_string(),
                    })?;
                BackendConfig::Http {
                    address,
                    token,
                    timeout: Duration::from_secs(
                        overrides.timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
                    ),
                }
            }
        };

        Ok(Self {
            service,
            secret_path,
            env_file: overrides
                .env_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE)),
            backend,
            dry_run: overrides.dry_run,
        })
    }

    /// Build the fetcher for the configured backend
    #[allow(
        clippy::missing_errors_doc,
        reason = "Fails only if the HTTP client cannot be constructed"
    )]
    pub fn fetcher(&self) -> Result<Box<dyn SecretFetcher>, SyncError> {
        match &self.backend {
            BackendConfig::Cli { binary } => Ok(Box::new(VaultCliFetcher::new(binary.clone()))),
            BackendConfig::Http {
                address,
                token,
                timeout,
            } => VaultHttpFetcher::new(address.clone(), token.clone(), *timeout)
                .map(|fetcher| Box::new(fetcher) as Box<dyn SecretFetcher>)
                .map_err(|e| SyncError::FetchFailed {
                    path: self.secret_path.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_resolve_from_environment() {
        let config = SyncConfig::resolve(
            Overrides::default(),
            env(&[("SERVICE_SYSTEM_CODE", "billing"), ("REGION", "EU")]),
        )
        .unwrap();

        assert_eq!(config.service, "billing");
        assert_eq!(config.secret_path.as_str(), "secret/teams/origami/billing/eu");
        assert_eq!(config.env_file, PathBuf::from(".env"));
        assert!(matches!(config.backend, BackendConfig::Cli { .. }));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_region_defaults_to_local() {
        let config =
            SyncConfig::resolve(Overrides::default(), env(&[("SERVICE_SYSTEM_CODE", "svc")]))
                .unwrap();
        assert_eq!(config.secret_path.as_str(), "secret/teams/origami/svc/local");
    }

    #[test]
    fn test_empty_region_counts_as_unset() {
        let config = SyncConfig::resolve(
            Overrides::default(),
            env(&[("SERVICE_SYSTEM_CODE", "svc"), ("REGION", "")]),
        )
        .unwrap();
        assert!(config.secret_path.as_str().ends_with("/local"));
    }

    #[test]
    fn test_overrides_win_over_environment() {
        let overrides = Overrides {
            service: Some("cli-svc".to_string()),
            namespace: Some("platform".to_string()),
            env_file: Some(PathBuf::from("config/.env.local")),
            ..Overrides::default()
        };
        let config =
            SyncConfig::resolve(overrides, env(&[("SERVICE_SYSTEM_CODE", "env-svc")])).unwrap();

        assert_eq!(config.secret_path.as_str(), "secret/teams/platform/cli-svc/local");
        assert_eq!(config.env_file, PathBuf::from("config/.env.local"));
    }

    #[test]
    fn test_missing_service_fails() {
        let err = SyncConfig::resolve(Overrides::default(), env(&[])).unwrap_err();
        assert!(
            matches!(err, SyncError::ConfigurationMissing { ref variable } if variable == "SERVICE_SYSTEM_CODE")
        );
    }

    #[test]
    fn test_http_backend_requires_token() {
        let overrides = Overrides {
            backend: Backend::Http,
            vault_addr: Some("http://127.0.0.1:8200".to_string()),
            ..Overrides::default()
        };
        let err =
            SyncConfig::resolve(overrides, env(&[("SERVICE_SYSTEM_CODE", "svc")])).unwrap_err();
        assert!(
            matches!(err, SyncError::ConfigurationMissing { ref variable } if variable == "VAULT_TOKEN")
        );
    }

    #[test]
    fn test_http_backend_debug_hides_token() {
        let overrides = Overrides {
            backend: Backend::Http,
            ..Overrides::default()
        };
        let config = SyncConfig::resolve(
            overrides,
            env(&[
                ("SERVICE_SYSTEM_CODE", "svc"),
                ("VAULT_ADDR", "http://127.0.0.1:8200"),
                ("VAULT_TOKEN", "s.supersecret"),
            ]),
        )
        .unwrap();

        assert!(!format!("{config:?}").contains("supersecret"));
        let _fetcher = config.fetcher().unwrap();
    }
}
