//! CLI parser and entry point.

mod helpers;
mod replicate;

pub use helpers::load_soql;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "sfrep")]
#[command(about = "Salesforce attachment replication tool")]
#[command(version)]
pub struct Cli {
    /// Path to a file containing the driving SOQL query
    #[arg(long)]
    pub soql: PathBuf,

    /// Directory to save attachments under
    #[arg(long, default_value = "output/")]
    pub output_dir: PathBuf,

    /// Directory for the per-run outcome CSVs
    #[arg(long, default_value = "logs/")]
    pub logs_dir: PathBuf,

    /// Use canned in-memory data instead of a live org
    #[arg(long)]
    pub test_mode: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments and run the replication.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    replicate::cmd_replicate(&cli).await
}
