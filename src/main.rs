use std::path::PathBuf;

use clap::Parser;
use groups_sync::config::SyncConfig;
use groups_sync::{Result, SyncError, sync};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        println!("FATAL: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    let config = SyncConfig::load(&cli.config)?;
    sync::run(&config)?;
    Ok(())
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| SyncError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Mirror remote directory group membership into local system groups."
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "conf/groups_sync.yml")]
    config: PathBuf,
}
