//! Replication driver: records -> links -> latest versions -> disk.
//!
//! The traversal is fully sequential and isolates per-item failures: a
//! missing version, a failed download, or a failed write produces an error
//! outcome row and the run moves on. Only a failure of the driving query
//! itself aborts the run.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::outcome::{OutcomeLog, OutcomeRecord, OutcomeStatus};
use crate::salesforce::SalesforceApi;
use crate::storage::save_file;

/// Configuration for the replication driver.
pub struct ReplicateConfig {
    /// Root directory; files land at `{output_dir}/{record_id}/{filename}`.
    pub output_dir: PathBuf,
}

/// Counters for the end-of-run summary.
#[derive(Debug, Default)]
pub struct ReplicateStats {
    /// Records returned by the driving query.
    pub records: usize,
    /// Files saved to disk.
    pub saved: usize,
    /// Error outcome rows written.
    pub failed: usize,
}

/// Walks query results and mirrors every linked document's latest version
/// to disk, writing one outcome row per (record, link) pair.
pub struct ReplicateService {
    client: Arc<dyn SalesforceApi>,
    config: ReplicateConfig,
}

impl ReplicateService {
    /// Create a new replication service.
    pub fn new(client: Arc<dyn SalesforceApi>, config: ReplicateConfig) -> Self {
        Self { client, config }
    }

    /// Run the full traversal for `soql`.
    ///
    /// Each attempted (record, link) pair lands as exactly one row in the
    /// outcome log, success or error. Nothing is retried.
    pub async fn run(&self, soql: &str, log: &mut OutcomeLog) -> anyhow::Result<ReplicateStats> {
        let records = self.client.query(soql).await?;
        let mut stats = ReplicateStats {
            records: records.len(),
            ..Default::default()
        };

        for record in &records {
            let links = match self.client.content_document_links(&record.id).await {
                Ok(links) => links,
                Err(e) => {
                    // Without the link list there are no per-link outcomes
                    // to record; one error row stands in for the record.
                    warn!(record_id = %record.id, error = %e, "failed to list document links");
                    log.record(&OutcomeRecord::error(&record.id, "", "", &e.to_string()))?;
                    stats.failed += 1;
                    continue;
                }
            };

            for link in &links {
                let outcome = self
                    .replicate_link(&record.id, &link.content_document_id)
                    .await;
                match outcome.status {
                    OutcomeStatus::Success => stats.saved += 1,
                    OutcomeStatus::Error => stats.failed += 1,
                }
                log.record(&outcome)?;
            }
        }

        Ok(stats)
    }

    /// Mirror one document link, reducing every failure mode to an error
    /// outcome so the caller's loop never aborts.
    async fn replicate_link(&self, record_id: &str, content_document_id: &str) -> OutcomeRecord {
        let version = match self
            .client
            .latest_content_version(content_document_id)
            .await
        {
            Ok(Some(version)) => version,
            Ok(None) => {
                warn!(record_id, content_document_id, "no content version on record");
                return OutcomeRecord::error(record_id, "", "", "ContentVersion not found");
            }
            Err(e) => {
                warn!(record_id, content_document_id, error = %e, "failed to fetch content version");
                return OutcomeRecord::error(record_id, "", "", &e.to_string());
            }
        };

        let filename = version.file_name();

        let data = match self.client.download_version_data(&version).await {
            Ok(data) => data,
            Err(e) => {
                warn!(record_id, version_id = %version.id, error = %e, "download failed");
                return OutcomeRecord::error(record_id, &version.id, &filename, &e.to_string());
            }
        };

        let target_dir = self.config.output_dir.join(record_id);
        match save_file(&target_dir, &filename, &data) {
            Ok(saved) => {
                info!(record_id, version_id = %version.id, path = %saved.path.display(), "saved");
                OutcomeRecord::success(record_id, &version.id, &filename, &saved.file_name, &saved.path)
            }
            Err(e) => {
                warn!(record_id, version_id = %version.id, error = %e, "save failed");
                OutcomeRecord::error(record_id, &version.id, &filename, &e.to_string())
            }
        }
    }
}
