//! Vault dotenv library
//!
//! Reconciles a local `.env` file with the secrets Vault holds for a service.
//! Tests are included in the module files (e.g., reconciler.rs) and under `tests/`.
//!
//! ## Pipeline
//!
//! 1. [`config`] resolves the service, region and target file
//! 2. [`provider`] reads `secret/teams/{namespace}/{service}/{region}`
//! 3. [`parser`] splits the existing file into comments and assignments
//! 4. [`reconciler`] merges them, store values first, refusing inline comments
//! 5. [`serializer`] renders and atomically writes the result
//! 6. [`drift`] lists local variables Vault does not manage

pub mod config;
pub mod constants;
pub mod drift;
pub mod error;
pub mod parser;
pub mod paths;
pub mod provider;
pub mod reconciler;
pub mod serializer;
pub mod sync;

pub use config::{Backend, Overrides, SyncConfig};
pub use error::SyncError;
pub use reconciler::{MergedFile, SecretMap};
pub use sync::{run_sync, Outcome, SyncReport};
