//! # Provider Modules
//!
//! Backends that read a service's secrets from Vault.
//!
//! Each backend implements [`SecretFetcher`]. Both return the same response
//! envelope, a JSON object whose `data` field is the flat key/value map, so
//! parsing is shared in [`parse_read_response`].

pub mod vault_cli;
pub mod vault_http;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::paths::SecretPath;
use crate::reconciler::SecretMap;

pub use vault_cli::VaultCliFetcher;
pub use vault_http::VaultHttpFetcher;

/// Provider trait for reading secrets
#[async_trait]
pub trait SecretFetcher: Send + Sync {
    /// Read every key/value stored at `path`
    async fn fetch(&self, path: &SecretPath) -> Result<SecretMap, FetchError>;
}

/// Error type for secret reads
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{binary} exited with {status}: {stderr}")]
    CommandFailed {
        binary: String,
        status: String,
        stderr: String,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Vault returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("response is not valid JSON: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("response has no data")]
    MissingData,
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

/// Extract the `data` map from a Vault read response
///
/// String values are taken as-is; any other JSON value is kept as its JSON text.
#[allow(
    clippy::missing_errors_doc,
    reason = "Every FetchError variant documents its own failure"
)]
pub fn parse_read_response(body: &str) -> Result<SecretMap, FetchError> {
    let response: ReadResponse = serde_json::from_str(body)?;
    let data = response.data.ok_or(FetchError::MissingData)?;

    Ok(data
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read_response_data() {
        let body = r#"{
            "request_id": "5e4d",
            "lease_duration": 2764800,
            "data": {"DB_HOST": "10.0.0.5", "DB_PASS": "s3cr3t"}
        }"#;
        let secrets = parse_read_response(body).unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets["DB_HOST"], "10.0.0.5");
    }

    #[test]
    fn test_parse_read_response_non_string_values() {
        let secrets = parse_read_response(r#"{"data": {"PORT": 5432, "DEBUG": true}}"#).unwrap();
        assert_eq!(secrets["PORT"], "5432");
        assert_eq!(secrets["DEBUG"], "true");
    }

    #[test]
    fn test_parse_read_response_missing_data() {
        let err = parse_read_response(r#"{"warnings": null}"#).unwrap_err();
        assert!(matches!(err, FetchError::MissingData));
    }

    #[test]
    fn test_parse_read_response_null_data() {
        let err = parse_read_response(r#"{"data": null}"#).unwrap_err();
        assert!(matches!(err, FetchError::MissingData));
    }

    #[test]
    fn test_parse_read_response_invalid_json() {
        let err = parse_read_response("No value found at secret/teams/x").unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }
}
