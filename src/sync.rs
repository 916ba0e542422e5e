//! # Sync
//!
//! One reconciliation run: fetch → parse → reconcile → serialize → write.
//!
//! The run never exits the process. It returns a [`SyncReport`] on success or a
//! [`SyncError`] and leaves exit-code mapping to the binary.

use std::path::PathBuf;
use tracing::{info, info_span, warn, Instrument};

use crate::config::SyncConfig;
use crate::drift::unmanaged_keys;
use crate::error::SyncError;
use crate::parser::read_env_file;
use crate::paths::SecretPath;
use crate::provider::SecretFetcher;
use crate::reconciler::{reconcile, ExistingAssignments};
use crate::serializer::{render, write_atomic};

/// What the run did with the env file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The merged content replaced the env file
    Written,
    /// Dry run: the merged content, not written
    DryRun { content: String },
    /// Neither the store nor the file had any keys; the file was not touched
    NothingToWrite,
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub secret_path: SecretPath,
    pub env_file: PathBuf,
    /// Keys whose value now comes from the store
    pub store_keys: Vec<String>,
    /// Local keys the store does not know about
    pub unmanaged_keys: Vec<String>,
    pub outcome: Outcome,
}

/// Run one reconciliation of `config.env_file` against the store
#[allow(
    clippy::missing_errors_doc,
    reason = "Every SyncError variant documents its own failure"
)]
pub async fn run_sync(
    config: &SyncConfig,
    fetcher: &dyn SecretFetcher,
) -> Result<SyncReport, SyncError> {
    let span = info_span!("sync", path = %config.secret_path, file = %config.env_file.display());
    sync_env_file(config, fetcher).instrument(span).await
}

async fn sync_env_file(
    config: &SyncConfig,
    fetcher: &dyn SecretFetcher,
) -> Result<SyncReport, SyncError> {
    let secrets = fetcher
        .fetch(&config.secret_path)
        .await
        .map_err(|e| SyncError::FetchFailed {
            path: config.secret_path.to_string(),
            reason: e.to_string(),
        })?;
    info!("Fetched {} secrets", secrets.len());

    let lines = read_env_file(&config.env_file).await?;
    let existing = ExistingAssignments::from_lines(&lines);
    let merged = reconcile(&lines, &existing, &secrets)?;

    let unmanaged = unmanaged_keys(&existing, &secrets);
    if !unmanaged.is_empty() {
        warn!("{} local variables are not stored in Vault", unmanaged.len());
    }

    let store_keys: Vec<String> = merged.store_keys().into_iter().map(str::to_string).collect();

    let outcome = if merged.is_empty() {
        info!("Nothing to write");
        Outcome::NothingToWrite
    } else {
        let content = render(&merged);
        if config.dry_run {
            Outcome::DryRun { content }
        } else {
            write_atomic(&config.env_file, &content)?;
            info!("Wrote {} lines", merged.lines().len());
            Outcome::Written
        }
    };

    Ok(SyncReport {
        secret_path: config.secret_path.clone(),
        env_file: config.env_file.clone(),
        store_keys,
        unmanaged_keys: unmanaged,
        outcome,
    })
}
