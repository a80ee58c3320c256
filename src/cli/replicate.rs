//! The replication command.

use std::sync::Arc;

use console::style;

use super::{helpers::load_soql, Cli};
use crate::config::{Credentials, Settings};
use crate::outcome::OutcomeLog;
use crate::salesforce::{FixtureClient, RestClient, SalesforceApi};
use crate::services::{ReplicateConfig, ReplicateService};

/// Run the replication described by the CLI arguments.
pub async fn cmd_replicate(cli: &Cli) -> anyhow::Result<()> {
    let soql = load_soql(&cli.soql)?;

    let settings = Settings {
        output_dir: cli.output_dir.clone(),
        logs_dir: cli.logs_dir.clone(),
    };
    settings.ensure_directories()?;

    let client: Arc<dyn SalesforceApi> = if cli.test_mode {
        Arc::new(FixtureClient::default())
    } else {
        let creds = Credentials::from_env()?;
        Arc::new(RestClient::login(&creds).await?)
    };

    let mut log = OutcomeLog::open(&settings.logs_dir)?;
    let service = ReplicateService::new(
        client,
        ReplicateConfig {
            output_dir: settings.output_dir.clone(),
        },
    );

    // The logs must be flushed on every exit path; a run error wins over a
    // flush error when both happen.
    let result = service.run(&soql, &mut log).await;
    let flushed = log.flush();
    let stats = result?;
    flushed?;

    let mark = if stats.failed == 0 {
        style("✓").green()
    } else {
        style("!").yellow()
    };
    println!(
        "{} Replicated {} file(s) from {} record(s), {} failed",
        mark, stats.saved, stats.records, stats.failed
    );
    println!("  success log: {}", log.success_path().display());
    println!("  error log:   {}", log.error_path().display());

    Ok(())
}
