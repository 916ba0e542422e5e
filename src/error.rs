//! # Errors
//!
//! Error type for a single sync run.
//!
//! Every variant is terminal: the run stops, the `.env` file is left as it was,
//! and the binary maps the error to a non-zero exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::constants::ENV_SERVICE;

/// Errors produced while reconciling a `.env` file with the secret store
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required setting was not provided
    #[error("Missing required configuration: {variable} is not set")]
    ConfigurationMissing { variable: String },

    /// A setting cannot be used as a secret path segment
    #[error("Invalid {field} '{value}': only letters, digits, '.', '_' and '-' are allowed")]
    ConfigurationInvalid { field: String, value: String },

    /// The secret store could not be read or returned no usable data
    #[error("Could not load secrets from {path}: {reason}")]
    FetchFailed { path: String, reason: String },

    /// An existing value that would be overwritten carries an inline comment
    #[error("The \"{key}\" environment variable has an inline comment")]
    InlineCommentConflict { key: String },

    /// The existing env file exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The merged content could not be written
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Get remediation guidance for this error
    pub fn remediation(&self) -> String {
        match self {
            SyncError::ConfigurationMissing { variable } if variable == ENV_SERVICE => {
                format!("Set the environment variable \"{ENV_SERVICE}\" in your Makefile or pass --service.")
            }
            SyncError::ConfigurationMissing { variable } => {
                format!("Set {variable} and re-run.")
            }
            SyncError::ConfigurationInvalid { field, .. } => {
                format!("Use a {field} without slashes or whitespace.")
            }
            SyncError::FetchFailed { .. } => {
                "Check that you are logged in to Vault and that the path exists.".to_string()
            }
            SyncError::InlineCommentConflict { .. } => {
                "Please move this comment to its own line.".to_string()
            }
            SyncError::ReadFailed { .. } | SyncError::WriteFailed { .. } => {
                "Check file permissions and available disk space.".to_string()
            }
        }
    }
}
