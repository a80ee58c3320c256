//! Per-attempt outcome records and the per-run CSV logs they land in.
//!
//! Every (record, link) pair the driver touches produces exactly one
//! `OutcomeRecord`, routed to either the success or the error log. Rows are
//! written synchronously as the run progresses so a crash still leaves the
//! outcomes processed so far on disk.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::storage::ensure_directory;

/// Whether an attempt produced a saved file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// One row of the outcome logs.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRecord {
    pub record_id: String,
    pub content_version_id: String,
    pub filename: String,
    pub saved_filename: String,
    pub saved_path: String,
    pub status: OutcomeStatus,
    pub message: String,
}

impl OutcomeRecord {
    /// A success row for a file saved to disk.
    pub fn success(
        record_id: &str,
        version_id: &str,
        filename: &str,
        saved_filename: &str,
        saved_path: &Path,
    ) -> Self {
        Self {
            record_id: record_id.to_string(),
            content_version_id: version_id.to_string(),
            filename: filename.to_string(),
            saved_filename: saved_filename.to_string(),
            saved_path: saved_path.display().to_string(),
            status: OutcomeStatus::Success,
            message: "OK".to_string(),
        }
    }

    /// An error row. Version id and filename may be empty when the failure
    /// happened before a version was resolved.
    pub fn error(record_id: &str, version_id: &str, filename: &str, message: &str) -> Self {
        Self {
            record_id: record_id.to_string(),
            content_version_id: version_id.to_string(),
            filename: filename.to_string(),
            saved_filename: String::new(),
            saved_path: String::new(),
            status: OutcomeStatus::Error,
            message: message.to_string(),
        }
    }
}

/// Column order of both outcome logs.
const HEADER: [&str; 7] = [
    "record_id",
    "content_version_id",
    "filename",
    "saved_filename",
    "saved_path",
    "status",
    "message",
];

/// The pair of per-run CSV logs, one for successes and one for errors.
///
/// Both files are created eagerly with a header row so an empty run still
/// leaves well-formed logs behind.
pub struct OutcomeLog {
    success: csv::Writer<File>,
    error: csv::Writer<File>,
    success_path: PathBuf,
    error_path: PathBuf,
}

impl OutcomeLog {
    /// Open `success_{timestamp}.csv` and `error_{timestamp}.csv` under
    /// `logs_dir`, creating the directory if needed.
    pub fn open(logs_dir: &Path) -> anyhow::Result<Self> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Self::open_with_names(
            logs_dir,
            &format!("success_{timestamp}.csv"),
            &format!("error_{timestamp}.csv"),
        )
    }

    /// Open the log pair with explicit filenames.
    pub fn open_with_names(
        logs_dir: &Path,
        success_name: &str,
        error_name: &str,
    ) -> anyhow::Result<Self> {
        ensure_directory(logs_dir)?;
        let success_path = logs_dir.join(success_name);
        let error_path = logs_dir.join(error_name);

        // Headers are written here rather than by serde so that an empty
        // run still produces well-formed files.
        let mut success = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&success_path)?;
        let mut error = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&error_path)?;
        success.write_record(HEADER)?;
        error.write_record(HEADER)?;
        success.flush()?;
        error.flush()?;

        Ok(Self {
            success,
            error,
            success_path,
            error_path,
        })
    }

    /// Append one outcome row to the log matching its status.
    pub fn record(&mut self, outcome: &OutcomeRecord) -> anyhow::Result<()> {
        let writer = match outcome.status {
            OutcomeStatus::Success => &mut self.success,
            OutcomeStatus::Error => &mut self.error,
        };
        writer.serialize(outcome)?;
        writer.flush()?;
        Ok(())
    }

    /// Flush both writers. Called on every exit path of a run.
    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.success.flush()?;
        self.error.flush()?;
        Ok(())
    }

    /// Path of the success log.
    pub fn success_path(&self) -> &Path {
        &self.success_path
    }

    /// Path of the error log.
    pub fn error_path(&self) -> &Path {
        &self.error_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn open_test_log(dir: &Path) -> OutcomeLog {
        OutcomeLog::open_with_names(dir, "success.csv", "error.csv").unwrap()
    }

    #[test]
    fn test_header_written_on_open() {
        let dir = tempdir().unwrap();
        let mut log = open_test_log(dir.path());
        log.flush().unwrap();

        let header = "record_id,content_version_id,filename,saved_filename,saved_path,status,message";
        let success = std::fs::read_to_string(log.success_path()).unwrap();
        let error = std::fs::read_to_string(log.error_path()).unwrap();
        assert!(success.starts_with(header));
        assert!(error.starts_with(header));
        // Header only, no data rows yet.
        assert_eq!(success.lines().count(), 1);
        assert_eq!(error.lines().count(), 1);
    }

    #[test]
    fn test_rows_routed_by_status() {
        let dir = tempdir().unwrap();
        let mut log = open_test_log(dir.path());

        log.record(&OutcomeRecord::success(
            "0011",
            "cv1",
            "a.txt",
            "a.txt",
            &PathBuf::from("out/0011/a.txt"),
        ))
        .unwrap();
        log.record(&OutcomeRecord::error("0012", "", "", "ContentVersion not found"))
            .unwrap();
        log.flush().unwrap();

        let success = std::fs::read_to_string(log.success_path()).unwrap();
        let error = std::fs::read_to_string(log.error_path()).unwrap();
        assert!(success.contains("0011,cv1,a.txt,a.txt,out/0011/a.txt,success,OK"));
        assert!(!success.contains("0012"));
        assert!(error.contains("0012,,,,,error,ContentVersion not found"));
    }

    #[test]
    fn test_message_with_comma_is_quoted() {
        let dir = tempdir().unwrap();
        let mut log = open_test_log(dir.path());

        log.record(&OutcomeRecord::error(
            "0011",
            "cv1",
            "a.txt",
            "Permission denied, retry as admin",
        ))
        .unwrap();
        log.flush().unwrap();

        let error = std::fs::read_to_string(log.error_path()).unwrap();
        assert!(error.contains("\"Permission denied, retry as admin\""));
    }
}
