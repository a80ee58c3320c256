//! Salesforce collaborator: the capability the replication driver talks to.
//!
//! Two implementations: `RestClient` speaks to a live org, `FixtureClient`
//! answers from in-memory data. The driver only ever sees the
//! `SalesforceApi` trait, keeping it decoupled from the transport.

mod fixture;
mod rest;

pub use fixture::{FixtureClient, FixtureData};
pub use rest::RestClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ContentDocumentLink, ContentVersion, SalesforceRecord};

/// Errors surfaced by the Salesforce collaborator.
#[derive(Debug, Error)]
pub enum SalesforceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Login failed: {0}")]
    Auth(String),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Operations the replication driver needs from a Salesforce org.
#[async_trait]
pub trait SalesforceApi: Send + Sync {
    /// Run a SOQL query, following pagination until all rows are returned.
    /// Rows without a usable `Id` are dropped with a warning.
    async fn query(&self, soql: &str) -> Result<Vec<SalesforceRecord>, SalesforceError>;

    /// List the document links attached to a record.
    async fn content_document_links(
        &self,
        record_id: &str,
    ) -> Result<Vec<ContentDocumentLink>, SalesforceError>;

    /// Fetch the latest version of a document, if any exists.
    async fn latest_content_version(
        &self,
        content_document_id: &str,
    ) -> Result<Option<ContentVersion>, SalesforceError>;

    /// Download a version's binary content.
    async fn download_version_data(
        &self,
        version: &ContentVersion,
    ) -> Result<Vec<u8>, SalesforceError>;
}
