//! IDScan console - operator shell for the identity-document recognition
//! backend.
//!
//! Reads commands from stdin (`help` lists them) and prints results and
//! visible notifications to stdout. Logs go to stderr.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod command;
mod render;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use idscan_client::HttpBackend;
use idscan_core::AppConfig;
use idscan_session::Session;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;

/// Command-line arguments for the idscan console
#[derive(Parser, Debug)]
#[command(name = "idscan")]
#[command(about = "Upload, search, edit and delete recognized identity documents")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "IDSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration
    #[arg(short, long)]
    backend_url: Option<String>,
}

/// Initialize tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,idscan=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => AppConfig::load_with_env().context("failed to load config")?,
    };
    if let Some(url) = &args.backend_url {
        config.backend.base_url.clone_from(url);
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    info!("Starting IDScan console v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let backend =
        HttpBackend::from_config(&config.backend).context("failed to create backend client")?;
    info!(url = backend.base_url(), "using recognition backend");

    let session = Session::with_config(backend, &config);
    shell::run(
        &session,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
    .context("console i/o failed")?;

    info!("IDScan console exiting");
    Ok(())
}
