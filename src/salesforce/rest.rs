//! Live Salesforce client: SOAP login handshake, REST queries, content
//! download.
//!
//! Authentication uses the username/password + security token login flow.
//! The session obtained at login is reused for the whole run; an expired
//! session surfaces as an API error rather than being refreshed
//! transparently.

use reqwest::Client;
use serde::Deserialize;

use super::{SalesforceApi, SalesforceError};
use crate::config::Credentials;
use crate::models::{ContentDocumentLink, ContentVersion, SalesforceRecord, VersionData};

/// REST API version used for all data calls.
const API_VERSION: &str = "59.0";

/// Client bound to one org instance and one login session.
pub struct RestClient {
    client: Client,
    instance_url: String,
    session_id: String,
}

/// One page of query results.
#[derive(Deserialize)]
struct QueryResponse<T> {
    done: bool,
    #[serde(rename = "nextRecordsUrl")]
    next_records_url: Option<String>,
    records: Vec<T>,
}

impl RestClient {
    /// Log in and return a client bound to the instance the login
    /// handshake reports.
    pub async fn login(creds: &Credentials) -> Result<Self, SalesforceError> {
        let client = Client::builder()
            .user_agent(concat!("sfreplicate/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        let login_url = format!(
            "https://{}.salesforce.com/services/Soap/u/{}",
            creds.domain, API_VERSION
        );
        // The security token is appended to the password, per the
        // username/password login flow.
        let secret = format!("{}{}", creds.password, creds.security_token);
        let envelope = login_envelope(&creds.username, &secret);

        let response = client
            .post(&login_url)
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let fault = extract_tag(&body, "faultstring").unwrap_or(body);
            return Err(SalesforceError::Auth(fault));
        }

        let session_id = extract_tag(&body, "sessionId").ok_or_else(|| {
            SalesforceError::Malformed("login response missing sessionId".to_string())
        })?;
        let server_url = extract_tag(&body, "serverUrl").ok_or_else(|| {
            SalesforceError::Malformed("login response missing serverUrl".to_string())
        })?;

        // serverUrl points at the SOAP endpoint; the instance is its origin.
        let instance_url = server_url
            .split("/services")
            .next()
            .unwrap_or(server_url.as_str())
            .to_string();

        tracing::debug!(instance = %instance_url, "logged in");

        Ok(Self {
            client,
            instance_url,
            session_id,
        })
    }

    /// Run a SOQL query, following `nextRecordsUrl` pages until done.
    async fn query_all<T: serde::de::DeserializeOwned>(
        &self,
        soql: &str,
    ) -> Result<Vec<T>, SalesforceError> {
        let first_url = format!(
            "{}/services/data/v{}/query",
            self.instance_url, API_VERSION
        );

        let mut records = Vec::new();
        let mut next: Option<String> = None;

        loop {
            let request = match &next {
                None => self.client.get(&first_url).query(&[("q", soql)]),
                Some(url) => self.client.get(url),
            };

            tracing::debug!(soql, page = next.is_some(), "query");
            let response = request.bearer_auth(&self.session_id).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SalesforceError::Api {
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }

            let page: QueryResponse<T> = response.json().await?;
            records.extend(page.records);

            if page.done {
                break;
            }
            match page.next_records_url {
                Some(url) => next = Some(format!("{}{}", self.instance_url, url)),
                None => break,
            }
        }

        Ok(records)
    }
}

#[async_trait::async_trait]
impl SalesforceApi for RestClient {
    async fn query(&self, soql: &str) -> Result<Vec<SalesforceRecord>, SalesforceError> {
        let rows: Vec<serde_json::Value> = self.query_all(soql).await?;
        let records = rows
            .into_iter()
            .filter_map(|row| match row.get("Id").and_then(|id| id.as_str()) {
                Some(id) => Some(SalesforceRecord { id: id.to_string() }),
                None => {
                    tracing::warn!(%row, "query row has no Id field, skipping");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    async fn content_document_links(
        &self,
        record_id: &str,
    ) -> Result<Vec<ContentDocumentLink>, SalesforceError> {
        let soql = format!(
            "SELECT ContentDocumentId FROM ContentDocumentLink WHERE LinkedEntityId = '{record_id}'"
        );
        self.query_all(&soql).await
    }

    async fn latest_content_version(
        &self,
        content_document_id: &str,
    ) -> Result<Option<ContentVersion>, SalesforceError> {
        let soql = format!(
            "SELECT Id, Title, FileExtension, VersionData FROM ContentVersion \
             WHERE ContentDocumentId = '{content_document_id}' \
             ORDER BY VersionNumber DESC LIMIT 1"
        );
        let versions: Vec<ContentVersion> = self.query_all(&soql).await?;
        Ok(versions.into_iter().next())
    }

    async fn download_version_data(
        &self,
        version: &ContentVersion,
    ) -> Result<Vec<u8>, SalesforceError> {
        let path = match &version.version_data {
            VersionData::Inline(bytes) => return Ok(bytes.clone()),
            VersionData::Url(path) => path,
        };

        let url = if path.starts_with("http") {
            path.clone()
        } else {
            format!("{}{}", self.instance_url, path)
        };

        tracing::debug!(version_id = %version.id, "downloading version data");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.session_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SalesforceError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Build the SOAP login envelope for the username/password flow.
fn login_envelope(username: &str, password: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/" xmlns:urn="urn:partner.soap.sforce.com">
  <env:Body>
    <urn:login>
      <urn:username>{}</urn:username>
      <urn:password>{}</urn:password>
    </urn:login>
  </env:Body>
</env:Envelope>"#,
        escape_xml(username),
        escape_xml(password)
    )
}

/// Minimal XML text escaping for envelope fields.
fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Extract the text of the first `<tag>...</tag>` occurrence.
///
/// The login response is a fixed, flat SOAP document; a full XML parser
/// would be overkill for pulling two known fields out of it.
fn extract_tag(body: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].to_string())
}
