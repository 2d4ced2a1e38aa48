//! Operator command-line interface for the watchtower registry.
//!
//! The CLI is the caller of the protocol core: it loads the operator key,
//! expands a watchtower address into its address-family variants, runs one
//! authenticated session, and prints a status line per variant. Key storage
//! stays outside the core — the key only ever passes through as a hex string.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vigil_client::{ClientConfig, SessionClient};
use vigil_core::Identity;

/// Environment variable consulted when `--key-file` is not given.
const KEY_ENV: &str = "VIGIL_PRIVATE_KEY";

#[derive(Debug, Parser)]
#[command(name = "vigil", version, about = "Watchtower registry operator tooling")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Query the liveness status of a registered watchtower
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Network address of the watchtower to look up
    #[arg(long)]
    watchtower_address: String,

    /// Base URL of the registry API
    #[arg(long, default_value = "https://api.witnesschain.com")]
    api_url: String,

    /// File holding the operator's hex-encoded private key
    #[arg(long)]
    key_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Status(args) => status(args).await,
    }
}

async fn status(args: StatusArgs) -> Result<()> {
    let key_hex = load_key(args.key_file.as_deref())?;
    let identity = Identity::from_hex(&key_hex)?;

    info!(address = %identity.address(), api_url = %args.api_url, "authenticating");
    let config = ClientConfig::new(args.api_url);
    let session = SessionClient::new(config)?.establish(&identity).await?;

    // One query per address-family variant of the same endpoint; each result
    // is reported independently.
    let ids = vec![
        format!("IPv4/{}", args.watchtower_address),
        format!("IPv6/{}", args.watchtower_address),
    ];
    let records = session.query_many(&ids).await?;

    let now = Utc::now();
    for record in &records {
        println!("{}", record.report_line(now));
    }
    Ok(())
}

/// Load the operator's private key as a hex string, from the given file or
/// from the environment.
fn load_key(key_file: Option<&Path>) -> Result<String> {
    if let Some(path) = key_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display()))?;
        return Ok(raw.trim().to_string());
    }

    std::env::var(KEY_ENV)
        .with_context(|| format!("no --key-file given and {} is not set", KEY_ENV))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_status() {
        let cli = Cli::try_parse_from(["vigil", "status", "--watchtower-address", "1.2.3.4"])
            .unwrap();
        assert!(!cli.verbose);

        let Commands::Status(args) = cli.command;
        assert_eq!(args.watchtower_address, "1.2.3.4");
        assert_eq!(args.api_url, "https://api.witnesschain.com");
        assert_eq!(args.key_file, None);
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "vigil",
            "status",
            "--watchtower-address",
            "1.2.3.4",
            "--api-url",
            "http://localhost:8080",
            "--key-file",
            "/tmp/operator.key",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);

        let Commands::Status(args) = cli.command;
        assert_eq!(args.api_url, "http://localhost:8080");
        assert_eq!(args.key_file, Some(PathBuf::from("/tmp/operator.key")));
    }

    #[test]
    fn test_cli_requires_watchtower_address() {
        assert!(Cli::try_parse_from(["vigil", "status"]).is_err());
    }
}
