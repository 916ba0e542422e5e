//! # Secret Paths
//!
//! Builds the Vault path a service's secrets live under:
//! `secret/teams/{namespace}/{service}/{region}`.
//!
//! ## Quick Start
//!
//! ```rust
//! use vault_dotenv::paths::SecretPathBuilder;
//!
//! let path = SecretPathBuilder::new()
//!     .namespace("origami")
//!     .service("billing")
//!     .region("EU")
//!     .build()
//!     .unwrap();
//! assert_eq!(path.as_str(), "secret/teams/origami/billing/eu");
//! assert_eq!(path.http_path(), "v1/secret/teams/origami/billing/eu");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::constants::{DEFAULT_NAMESPACE, DEFAULT_REGION, ENV_SERVICE, SECRET_PATH_PREFIX};
use crate::error::SyncError;

static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+$")
        .expect("Failed to compile path segment regex - this should never happen")
});

/// A validated secret store path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretPath(String);

impl SecretPath {
    /// Path as passed to `vault read`
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path relative to the Vault HTTP API root
    pub fn http_path(&self) -> String {
        format!("v1/{}", self.0)
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builder for [`SecretPath`]
///
/// Namespace and region fall back to their defaults; the service is required.
/// The region is lower-cased.
#[derive(Debug, Clone, Default)]
pub struct SecretPathBuilder {
    namespace: Option<String>,
    service: Option<String>,
    region: Option<String>,
}

impl SecretPathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[allow(
        clippy::missing_errors_doc,
        reason = "ConfigurationMissing and ConfigurationInvalid are documented on SyncError"
    )]
    pub fn build(&self) -> Result<SecretPath, SyncError> {
        let service = self
            .service
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SyncError::ConfigurationMissing {
                variable: ENV_SERVICE.to_string(),
            })?;
        let namespace = self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
        let region = self
            .region
            .as_deref()
            .unwrap_or(DEFAULT_REGION)
            .to_lowercase();

        validate_segment("namespace", namespace)?;
        validate_segment("service", service)?;
        validate_segment("region", &region)?;

        Ok(SecretPath(format!(
            "{SECRET_PATH_PREFIX}/{namespace}/{service}/{region}"
        )))
    }
}

fn validate_segment(field: &str, value: &str) -> Result<(), SyncError> {
    if SEGMENT.is_match(value) && value != "." && value != ".." {
        Ok(())
    } else {
        Err(SyncError::ConfigurationInvalid {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_defaults() {
        let path = SecretPathBuilder::new().service("my-service").build().unwrap();
        assert_eq!(path.as_str(), "secret/teams/origami/my-service/local");
    }

    #[test]
    fn test_region_is_lowercased() {
        let path = SecretPathBuilder::new()
            .service("svc")
            .region("US-East")
            .build()
            .unwrap();
        assert_eq!(path.to_string(), "secret/teams/origami/svc/us-east");
    }

    #[test]
    fn test_custom_namespace() {
        let path = SecretPathBuilder::new()
            .namespace("platform")
            .service("svc")
            .build()
            .unwrap();
        assert_eq!(path.http_path(), "v1/secret/teams/platform/svc/local");
    }

    #[test]
    fn test_missing_service_is_configuration_missing() {
        let err = SecretPathBuilder::new().build().unwrap_err();
        assert!(
            matches!(err, SyncError::ConfigurationMissing { ref variable } if variable == ENV_SERVICE)
        );
    }

    #[test]
    fn test_empty_service_is_configuration_missing() {
        let err = SecretPathBuilder::new().service("").build().unwrap_err();
        assert!(matches!(err, SyncError::ConfigurationMissing { .. }));
    }

    #[test]
    fn test_slash_in_service_is_rejected() {
        let err = SecretPathBuilder::new().service("a/b").build().unwrap_err();
        assert!(matches!(err, SyncError::ConfigurationInvalid { ref field, .. } if field == "service"));
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        let err = SecretPathBuilder::new().service("..").build().unwrap_err();
        assert!(matches!(err, SyncError::ConfigurationInvalid { .. }));
    }
}
