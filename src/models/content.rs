//! Record and content models mirroring the Salesforce objects the
//! replicator traverses.

use serde::Deserialize;

/// A parent record returned by the driving SOQL query.
///
/// Only the `Id` field matters to the replicator; query rows carrying no
/// usable id are skipped upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesforceRecord {
    /// Salesforce record id.
    #[serde(rename = "Id")]
    pub id: String,
}

/// Association between a record and an uploaded document.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentDocumentLink {
    /// The linked document's id.
    #[serde(rename = "ContentDocumentId")]
    pub content_document_id: String,
}

/// The latest binary revision of a document.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentVersion {
    /// ContentVersion record id.
    #[serde(rename = "Id")]
    pub id: String,
    /// Display name of the file, without extension.
    #[serde(rename = "Title")]
    pub title: String,
    /// File extension, absent for extensionless uploads.
    #[serde(rename = "FileExtension")]
    pub file_extension: Option<String>,
    /// Where the binary content lives.
    #[serde(rename = "VersionData")]
    pub version_data: VersionData,
}

/// Binary content of a version: either already in memory (fixtures) or a
/// retrieval reference relative to the org instance (REST API).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VersionData {
    /// Path to fetch the content from, as returned by the REST API.
    Url(String),
    /// Inline bytes, used by fixture data.
    Inline(Vec<u8>),
}

impl ContentVersion {
    /// The filename this version should be saved under: `{title}.{ext}`
    /// when an extension is present, the title verbatim otherwise.
    pub fn file_name(&self) -> String {
        match self.file_extension.as_deref() {
            Some(ext) if !ext.is_empty() => format!("{}.{}", self.title, ext),
            _ => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_with_extension() {
        let version = ContentVersion {
            id: "cv1".to_string(),
            title: "report".to_string(),
            file_extension: Some("pdf".to_string()),
            version_data: VersionData::Inline(vec![]),
        };
        assert_eq!(version.file_name(), "report.pdf");
    }

    #[test]
    fn test_file_name_without_extension() {
        let version = ContentVersion {
            id: "cv1".to_string(),
            title: "NOTES".to_string(),
            file_extension: None,
            version_data: VersionData::Inline(vec![]),
        };
        assert_eq!(version.file_name(), "NOTES");
    }

    #[test]
    fn test_deserialize_rest_shape() {
        let json = serde_json::json!({
            "Id": "068xx0000001",
            "Title": "contract",
            "FileExtension": "pdf",
            "VersionData": "/services/data/v59.0/sobjects/ContentVersion/068xx0000001/VersionData"
        });
        let version: ContentVersion = serde_json::from_value(json).unwrap();
        assert_eq!(version.id, "068xx0000001");
        assert!(matches!(version.version_data, VersionData::Url(_)));
    }
}
