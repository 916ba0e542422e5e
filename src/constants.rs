//! # Constants
//!
//! Shared constants used throughout the tool.
//!
//! These values represent reasonable defaults and can be overridden via
//! command-line flags or environment variables where applicable.

/// Environment variable holding the service identifier (required)
pub const ENV_SERVICE: &str = "SERVICE_SYSTEM_CODE";

/// Environment variable holding the deployment region (optional)
pub const ENV_REGION: &str = "REGION";

/// Environment variable overriding the Vault team namespace
pub const ENV_NAMESPACE: &str = "VAULT_TEAM_NAMESPACE";

/// Vault server address, used by the HTTP backend
pub const ENV_VAULT_ADDR: &str = "VAULT_ADDR";

/// Vault token, used by the HTTP backend
pub const ENV_VAULT_TOKEN: &str = "VAULT_TOKEN";

/// Region used when `REGION` is unset
pub const DEFAULT_REGION: &str = "LOCAL";

/// Team namespace under `secret/teams/`
pub const DEFAULT_NAMESPACE: &str = "origami";

/// Default target file
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Mount and prefix every secret path starts with
pub const SECRET_PATH_PREFIX: &str = "secret/teams";

/// Vault CLI binary invoked by the CLI backend
pub const VAULT_BINARY: &str = "vault";

/// Default HTTP request timeout for the HTTP backend (seconds)
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
