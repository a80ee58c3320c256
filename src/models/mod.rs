//! Data models for Salesforce attachment replication.

mod content;

pub use content::{ContentDocumentLink, ContentVersion, SalesforceRecord, VersionData};
