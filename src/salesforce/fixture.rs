//! In-memory Salesforce double for tests and offline runs.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{SalesforceApi, SalesforceError};
use crate::models::{ContentDocumentLink, ContentVersion, SalesforceRecord, VersionData};

/// Canned data served by a `FixtureClient`.
#[derive(Debug, Clone, Default)]
pub struct FixtureData {
    /// Rows returned by `query`, regardless of the query text.
    pub records: Vec<SalesforceRecord>,
    /// Record id -> its document links.
    pub links: HashMap<String, Vec<ContentDocumentLink>>,
    /// Content document id -> its latest version.
    pub versions: HashMap<String, ContentVersion>,
}

impl FixtureData {
    /// Add a query result record.
    pub fn with_record(mut self, id: &str) -> Self {
        self.records.push(SalesforceRecord { id: id.to_string() });
        self
    }

    /// Link a record to a content document.
    pub fn with_link(mut self, record_id: &str, content_document_id: &str) -> Self {
        self.links
            .entry(record_id.to_string())
            .or_default()
            .push(ContentDocumentLink {
                content_document_id: content_document_id.to_string(),
            });
        self
    }

    /// Register the latest version of a content document.
    pub fn with_version(
        mut self,
        content_document_id: &str,
        id: &str,
        title: &str,
        file_extension: Option<&str>,
        data: &[u8],
    ) -> Self {
        self.versions.insert(
            content_document_id.to_string(),
            ContentVersion {
                id: id.to_string(),
                title: title.to_string(),
                file_extension: file_extension.map(|s| s.to_string()),
                version_data: VersionData::Inline(data.to_vec()),
            },
        );
        self
    }
}

/// Collaborator that answers every call from `FixtureData`, never touching
/// the network and never failing.
///
/// `FixtureClient::default()` serves no data at all; this is what the CLI's
/// `--test-mode` uses to exercise the full pipeline without credentials.
#[derive(Debug, Clone, Default)]
pub struct FixtureClient {
    data: FixtureData,
}

impl FixtureClient {
    /// Create a client serving the given fixture data.
    pub fn new(data: FixtureData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl SalesforceApi for FixtureClient {
    async fn query(&self, _soql: &str) -> Result<Vec<SalesforceRecord>, SalesforceError> {
        Ok(self.data.records.clone())
    }

    async fn content_document_links(
        &self,
        record_id: &str,
    ) -> Result<Vec<ContentDocumentLink>, SalesforceError> {
        Ok(self.data.links.get(record_id).cloned().unwrap_or_default())
    }

    async fn latest_content_version(
        &self,
        content_document_id: &str,
    ) -> Result<Option<ContentVersion>, SalesforceError> {
        Ok(self.data.versions.get(content_document_id).cloned())
    }

    async fn download_version_data(
        &self,
        version: &ContentVersion,
    ) -> Result<Vec<u8>, SalesforceError> {
        // Fixture versions normally carry inline bytes; a URL is returned
        // as its UTF-8 bytes, mirroring how canned string data behaves.
        match &version.version_data {
            VersionData::Inline(bytes) => Ok(bytes.clone()),
            VersionData::Url(url) => Ok(url.clone().into_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_fixture_returns_nothing() {
        let client = FixtureClient::default();
        assert!(client.query("SELECT Id FROM Account").await.unwrap().is_empty());
        assert!(client
            .content_document_links("0011")
            .await
            .unwrap()
            .is_empty());
        assert!(client
            .latest_content_version("cd1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_fixture_round_trip() {
        let data = FixtureData::default()
            .with_record("0011")
            .with_link("0011", "cd1")
            .with_version("cd1", "cv1", "test", Some("txt"), b"data");
        let client = FixtureClient::new(data);

        let records = client.query("SELECT Id FROM Account").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "0011");

        let links = client.content_document_links("0011").await.unwrap();
        assert_eq!(links.len(), 1);

        let version = client
            .latest_content_version("cd1")
            .await
            .unwrap()
            .expect("version should exist");
        assert_eq!(version.file_name(), "test.txt");

        let bytes = client.download_version_data(&version).await.unwrap();
        assert_eq!(bytes, b"data");
    }
}
