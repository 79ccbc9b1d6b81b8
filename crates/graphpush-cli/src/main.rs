use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use graphpush_core::DEFAULT_REGISTRY;
use graphpush_loader::{load_graph, read_tree};
use graphpush_quay::{QuayClient, QuayConfig, DEFAULT_TIMEOUT};
use graphpush_sync::sync_graph;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "graphpush")]
#[command(about = "Push upgrade graph metadata to Quay.io manifest labels", long_about = None)]
struct Cli {
    /// Quay token (https://docs.quay.io/api/#applications-and-tokens); without
    /// one, label changes are only logged.
    #[arg(short, long, env = "QUAY_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Directory holding the `channels/` and `edges/` trees.
    #[arg(long, default_value = ".")]
    root: PathBuf,
    #[arg(long, default_value = DEFAULT_REGISTRY)]
    registry: String,
    /// Base URL for label and blob requests [default: https://<registry>]
    #[arg(long)]
    api_base: Option<String>,
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,
}

impl Cli {
    fn quay_config(&self) -> QuayConfig {
        QuayConfig {
            registry: self.registry.clone(),
            api_base: self
                .api_base
                .clone()
                .unwrap_or_else(|| format!("https://{}", self.registry)),
            token: self.token.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let tree = read_tree(&cli.root)
        .with_context(|| format!("failed reading graph from {}", cli.root.display()))?;
    let nodes = load_graph(&tree)?;

    let mut client = QuayClient::new(cli.quay_config())?;
    if client.is_dry_run() {
        tracing::info!("no token given, running in dry-run mode");
    }

    let summary = sync_graph(&mut client, &nodes)?;
    println!("{}", summary.summary_line());
    Ok(())
}
