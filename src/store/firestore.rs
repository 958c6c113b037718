//! Firestore REST adapter for the report store.
//!
//! Documents live under a single collection; field values use Firestore's
//! typed-value JSON encoding. The server-assigned `createTime` doubles as
//! the report date. Access token is injected configuration; this adapter
//! never mints credentials.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use super::traits::{DocumentStore, NewReport, Report, ReportContent, REPORT_ICON};
use crate::config::FirestoreConfig;
use crate::providers::{api_error, build_http_client};

pub struct FirestoreStore {
    base_url: String,
    project_id: String,
    collection: String,
    access_token: Option<String>,
    client: Client,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> Self {
        let access_token = config.resolve_access_token();
        if access_token.is_none() {
            warn!("no Firestore access token configured; report calls will be rejected upstream");
        }
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            collection: config.collection.clone(),
            access_token,
            client: build_http_client(),
        }
    }

    /// `{base}/projects/{p}/databases/(default)/documents/{collection}`
    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, self.collection
        )
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.access_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default)]
    create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
}

fn string_value(text: &str) -> Value {
    json!({ "stringValue": text })
}

fn read_string(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn read_map<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    fields
        .get(key)?
        .get("mapValue")?
        .get("fields")?
        .as_object()
}

/// Encode a new report in Firestore's typed-value document format.
fn encode_report(new: &NewReport) -> Value {
    json!({
        "fields": {
            "title": string_value(&new.title),
            "icon_name": string_value(REPORT_ICON),
            "content": {
                "mapValue": {
                    "fields": {
                        "diagnosis": string_value(&new.diagnosis),
                        "recommendations": string_value(&new.recommendations),
                    }
                }
            }
        }
    })
}

fn decode_report(doc: &FirestoreDocument) -> Report {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .unwrap_or(doc.name.as_str())
        .to_string();

    let date = doc
        .create_time
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc));

    let content = read_map(&doc.fields, "content")
        .map(|fields| ReportContent {
            diagnosis: read_string(fields, "diagnosis"),
            recommendations: read_string(fields, "recommendations"),
        })
        .unwrap_or_default();

    let icon_name = match read_string(&doc.fields, "icon_name") {
        name if name.is_empty() => REPORT_ICON.to_string(),
        name => name,
    };

    Report {
        id,
        title: read_string(&doc.fields, "title"),
        icon_name,
        date,
        content,
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_reports(&self) -> Result<Vec<Report>> {
        let request = self
            .client
            .get(self.collection_url())
            .query(&[("pageSize", "100"), ("orderBy", "createTime desc")]);

        let response = self
            .with_auth(request)
            .send()
            .await
            .context("failed to reach Firestore")?;
        if !response.status().is_success() {
            return Err(api_error("firestore", response).await);
        }

        let listed: ListDocumentsResponse = response
            .json()
            .await
            .context("failed to decode Firestore list response")?;
        Ok(listed.documents.iter().map(decode_report).collect())
    }

    async fn create_report(&self, new: NewReport) -> Result<Report> {
        let request = self
            .client
            .post(self.collection_url())
            .json(&encode_report(&new));

        let response = self
            .with_auth(request)
            .send()
            .await
            .context("failed to reach Firestore")?;
        if !response.status().is_success() {
            return Err(api_error("firestore", response).await);
        }

        let created: FirestoreDocument = response
            .json()
            .await
            .context("failed to decode Firestore create response")?;
        Ok(decode_report(&created))
    }

    async fn get_report(&self, id: &str) -> Result<Option<Report>> {
        let url = format!("{}/{}", self.collection_url(), id);
        let response = self
            .with_auth(self.client.get(url))
            .send()
            .await
            .context("failed to reach Firestore")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error("firestore", response).await);
        }

        let doc: FirestoreDocument = response
            .json()
            .await
            .context("failed to decode Firestore document")?;
        Ok(Some(decode_report(&doc)))
    }

    fn name(&self) -> &str {
        "firestore"
    }
}
