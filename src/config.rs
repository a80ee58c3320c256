//! Runtime settings for sfreplicate.
//!
//! Credentials come from the environment (a `.env` file is loaded by the
//! binary before startup); directory layout comes from CLI flags.

use std::env;
use std::path::PathBuf;

use crate::storage::ensure_directory;

/// Auth domain used when `SF_DOMAIN` is unset: "login" is production,
/// "test" is a sandbox.
pub const DEFAULT_DOMAIN: &str = "login";

/// Credentials for the username/password + security token login flow.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub security_token: String,
    /// Auth domain, e.g. "login" or "test".
    pub domain: String,
}

impl Credentials {
    /// Read credentials from `SF_USERNAME`, `SF_PASSWORD`,
    /// `SF_SECURITY_TOKEN` and `SF_DOMAIN`.
    ///
    /// Fails naming the missing variable so a bad deployment is obvious
    /// before any network traffic happens.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            username: require_env("SF_USERNAME")?,
            password: require_env("SF_PASSWORD")?,
            security_token: require_env("SF_SECURITY_TOKEN")?,
            domain: env::var("SF_DOMAIN").unwrap_or_else(|_| DEFAULT_DOMAIN.to_string()),
        })
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("environment variable {name} is not set"))
}

/// Directory layout for a run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root for saved attachments.
    pub output_dir: PathBuf,
    /// Where the per-run outcome CSVs are written.
    pub logs_dir: PathBuf,
}

impl Settings {
    /// Create the output and log directories if missing. Idempotent.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        ensure_directory(&self.output_dir)?;
        ensure_directory(&self.logs_dir)?;
        Ok(())
    }
}
