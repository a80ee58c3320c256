//! sfreplicate - Salesforce attachment replication tool.
//!
//! Replicates file attachments linked to Salesforce records onto local
//! disk, writing one CSV outcome row per attempted file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sfreplicate::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "sfreplicate=info"
    } else {
        "sfreplicate=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
