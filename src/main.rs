//! # vault-dotenv
//!
//! Updates a `.env` file with the secrets Vault holds for a service.
//!
//! ## Usage
//!
//! ```bash
//! # Service and region from the environment (typically set in a Makefile)
//! SERVICE_SYSTEM_CODE=billing REGION=EU vault-dotenv
//!
//! # Explicit settings, printing the result instead of writing it
//! vault-dotenv --service billing --region eu --env-file .env.local --dry-run
//!
//! # Without the vault binary, using VAULT_ADDR and VAULT_TOKEN
//! vault-dotenv --backend http
//! ```
//!
//! Existing variables are kept, values from Vault win, comments stay where they
//! were. The run aborts without touching the file if a value that Vault would
//! overwrite has an inline comment.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use vault_dotenv::{run_sync, Backend, Outcome, Overrides, SyncConfig, SyncError, SyncReport};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_GIT_HASH"),
    ", built ",
    env!("BUILD_DATETIME"),
    ")"
);

/// Write Vault secrets for a service into a .env file
#[derive(Parser)]
#[command(name = "vault-dotenv", version, long_version = LONG_VERSION)]
#[command(
    about = "Write Vault secrets for a service into a .env file",
    long_about = None,
    after_help = "\
Environment:
  SERVICE_SYSTEM_CODE   service identifier (required unless --service)
  REGION                region, defaults to LOCAL
  VAULT_TEAM_NAMESPACE  team namespace, defaults to origami
  VAULT_ADDR            Vault address (http backend)
  VAULT_TOKEN           Vault token (http backend)
  RUST_LOG              log filter, e.g. vault_dotenv=debug
"
)]
struct Cli {
    /// Service identifier (overrides SERVICE_SYSTEM_CODE)
    #[arg(short, long)]
    service: Option<String>,

    /// Region (overrides REGION); lower-cased before use
    #[arg(short, long)]
    region: Option<String>,

    /// Team namespace under secret/teams/ (overrides VAULT_TEAM_NAMESPACE)
    #[arg(short, long)]
    namespace: Option<String>,

    /// File to update
    #[arg(short, long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// How to read from Vault
    #[arg(long, value_enum, default_value_t = Backend::Cli)]
    backend: Backend,

    /// Vault address for the http backend (overrides VAULT_ADDR)
    #[arg(long, value_name = "URL")]
    vault_addr: Option<String>,

    /// Request timeout in seconds for the http backend
    #[arg(long, value_name = "SECONDS")]
    timeout_secs: Option<u64>,

    /// Print the merged file instead of writing it
    #[arg(long)]
    dry_run: bool,
}

impl From<Cli> for Overrides {
    fn from(cli: Cli) -> Self {
        Self {
            service: cli.service,
            region: cli.region,
            namespace: cli.namespace,
            env_file: cli.env_file,
            backend: cli.backend,
            vault_addr: cli.vault_addr,
            timeout_secs: cli.timeout_secs,
            dry_run: cli.dry_run,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --dry-run output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vault_dotenv=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli.into())) {
        Ok((service, report)) => {
            print_report(&service, &report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", e.remediation());
            ExitCode::FAILURE
        }
    }
}

async fn run(overrides: Overrides) -> Result<(String, SyncReport), SyncError> {
    let config = SyncConfig::from_env(overrides)?;
    let fetcher = config.fetcher()?;
    let report = run_sync(&config, fetcher.as_ref()).await?;
    Ok((config.service, report))
}

fn print_report(service: &str, report: &SyncReport) {
    match &report.outcome {
        Outcome::Written => {
            println!(
                "Vault secrets for \"{service}\" have been written to {} ({} from {}: {})",
                report.env_file.display(),
                report.store_keys.len(),
                report.secret_path,
                report.store_keys.join(", ")
            );
        }
        Outcome::DryRun { content } => {
            print!("{content}");
        }
        Outcome::NothingToWrite => {
            println!(
                "No secrets found for \"{service}\" at {}; {} was not changed",
                report.secret_path,
                report.env_file.display()
            );
        }
    }

    if !report.unmanaged_keys.is_empty() {
        let message = format!(
            "The following environment variables are custom and not stored in Vault:\n{}",
            report.unmanaged_keys.join(", ")
        );
        // Keep dry-run stdout a valid .env file
        if matches!(report.outcome, Outcome::DryRun { .. }) {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }
}
