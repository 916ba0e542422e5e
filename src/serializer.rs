//! # Serializer
//!
//! Renders a [`MergedFile`] back to `.env` text and writes it to disk.
//!
//! Writes go through a temporary file in the target directory which is then
//! renamed over the target, so readers see either the old file or the new
//! one, never a partial write.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::SyncError;
use crate::reconciler::{MergedFile, MergedLine};

/// Render merged lines as `.env` text, one newline-terminated line per entry
pub fn render(merged: &MergedFile) -> String {
    let mut content = String::new();
    for line in merged.lines() {
        match line {
            MergedLine::Comment(text) => content.push_str(text),
            MergedLine::Entry(entry) => {
                content.push_str(&entry.key);
                content.push('=');
                content.push_str(&entry.value);
            }
        }
        content.push('\n');
    }
    content
}

/// Replace `path` with `content` atomically
///
/// An existing file keeps its permissions. On failure the original file is
/// left untouched and the temporary file is removed.
#[allow(
    clippy::missing_errors_doc,
    reason = "WriteFailed is the only error and is documented on SyncError"
)]
pub fn write_atomic(path: &Path, content: &str) -> Result<(), SyncError> {
    let write_failed = |source: std::io::Error| SyncError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(content.as_bytes()).map_err(write_failed)?;
    tmp.flush().map_err(write_failed)?;

    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_failed)?;
    }
    tmp.as_file().sync_all().map_err(write_failed)?;

    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
