//! # Parser
//!
//! Parses an existing `.env` file into an ordered list of typed lines.
//!
//! ## Rules
//!
//! - A line whose leading-whitespace-trimmed form starts with `#` is a comment
//! - Otherwise a line containing `=` is an assignment, split on the first `=`
//! - Anything else (blank lines, lines without `=`) is dropped
//!
//! Values are kept raw: no trimming, unquoting or unescaping. A value may itself
//! contain `=` or `#`.

use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::error::SyncError;

/// Content of a retained line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Raw comment line, including the leading `#`
    Comment { text: String },
    /// `KEY=VALUE` with the value exactly as written after the first `=`
    Assignment { key: String, value: String },
}

/// One retained line of the existing file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLine {
    /// Zero-based index among retained lines
    pub position: usize,
    pub kind: LineKind,
}

impl EnvLine {
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, LineKind::Comment { .. })
    }
}

/// Parse `.env` content into typed lines with contiguous positions
pub fn parse_env_content(content: &str) -> Vec<EnvLine> {
    let mut lines = Vec::new();

    for raw in content.lines() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let kind = if raw.trim_start().starts_with('#') {
            LineKind::Comment {
                text: raw.to_string(),
            }
        } else if let Some((key, value)) = raw.split_once('=') {
            LineKind::Assignment {
                key: key.trim().to_string(),
                value: value.to_string(),
            }
        } else {
            if !raw.trim().is_empty() {
                debug!("Dropping line without '=': {} characters", raw.len());
            }
            continue;
        };

        lines.push(EnvLine {
            position: lines.len(),
            kind,
        });
    }

    lines
}

/// Read and parse an env file
///
/// A missing file yields an empty list so that the first sync can create it.
#[allow(
    clippy::missing_errors_doc,
    reason = "ReadFailed is the only error and is documented on SyncError"
)]
pub async fn read_env_file(path: &Path) -> Result<Vec<EnvLine>, SyncError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let lines = parse_env_content(&content);
            debug!("Parsed {} lines from {}", lines.len(), path.display());
            Ok(lines)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist yet, starting empty", path.display());
            Ok(Vec::new())
        }
        Err(source) => Err(SyncError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}
