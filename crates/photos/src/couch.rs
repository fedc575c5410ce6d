//! Minimal CouchDB HTTP client.
//!
//! Covers the handful of endpoints the service needs: database lifecycle,
//! `_bulk_docs` inserts, Mango indexes and queries, and single-document reads.

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CouchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid CouchDB URL: {0}")]
    InvalidUrl(String),
    #[error("CouchDB returned {status}: {reason}")]
    Status { status: u16, reason: String },
}

/// Error body returned by CouchDB on non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: String,
}

/// Per-document outcome from `_bulk_docs`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkDocResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub rev: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl BulkDocResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.ok.unwrap_or(self.rev.is_some())
    }
}

#[derive(Debug, Deserialize)]
struct AllDocsResponse<T> {
    rows: Vec<AllDocsRow<T>>,
}

#[derive(Debug, Deserialize)]
struct AllDocsRow<T> {
    id: String,
    doc: Option<T>,
}

#[derive(Debug, Deserialize)]
struct FindResponse<T> {
    docs: Vec<T>,
}

#[derive(Serialize)]
struct BulkDocsRequest<'a, T> {
    docs: &'a [T],
}

/// Connection settings shared by all databases on one CouchDB server.
#[derive(Debug, Clone)]
pub struct CouchClient {
    client: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl CouchClient {
    /// Creates a client for the server at `base_url`, e.g. `http://localhost:5984`.
    pub fn new(base_url: &str) -> Result<Self, CouchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| CouchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CouchError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            username: None,
            password: None,
        })
    }

    /// Uses HTTP basic auth for every request.
    pub fn with_credentials(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    /// Returns a handle to the named database. Does not touch the server.
    pub fn database(&self, name: impl Into<String>) -> CouchDatabase {
        CouchDatabase {
            client: self.clone(),
            name: name.into(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, CouchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CouchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }
}

/// A single CouchDB database.
#[derive(Debug, Clone)]
pub struct CouchDatabase {
    client: CouchClient,
    name: String,
}

impl CouchDatabase {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates the database.
    pub async fn create(&self, partitioned: bool) -> Result<(), CouchError> {
        let mut url = self.client.url(&[&self.name])?;
        url.query_pairs_mut()
            .append_pair("partitioned", if partitioned { "true" } else { "false" });

        let response = self.client.request(Method::PUT, url).send().await?;
        check_status(response).await?;
        debug!(database = %self.name, partitioned, "Created CouchDB database");
        Ok(())
    }

    /// Deletes the database. Returns `false` when it did not exist.
    pub async fn destroy(&self) -> Result<bool, CouchError> {
        let url = self.client.url(&[&self.name])?;
        let response = self.client.request(Method::DELETE, url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response).await?;
        Ok(true)
    }

    /// Inserts documents in one `_bulk_docs` request.
    pub async fn bulk_docs<T: Serialize>(
        &self,
        docs: &[T],
    ) -> Result<Vec<BulkDocResult>, CouchError> {
        let url = self.client.url(&[&self.name, "_bulk_docs"])?;
        let response = self
            .client
            .request(Method::POST, url)
            .json(&BulkDocsRequest { docs })
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Creates a Mango JSON index over `fields`.
    ///
    /// In a partitioned database the index is created global, so it serves
    /// plain `_find` queries as well as partition queries.
    pub async fn create_index(
        &self,
        fields: &[&str],
        name: &str,
        partitioned_database: bool,
    ) -> Result<(), CouchError> {
        let url = self.client.url(&[&self.name, "_index"])?;
        let body = index_body(fields, name, partitioned_database);

        let response = self
            .client
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Fetches one document by id.
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, CouchError> {
        let url = self.client.url(&[&self.name, id])?;
        let response = self.client.request(Method::GET, url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;
        Ok(Some(response.json().await?))
    }

    /// Runs a Mango `_find` query.
    pub async fn find<T: DeserializeOwned>(
        &self,
        selector: Value,
        limit: usize,
    ) -> Result<Vec<T>, CouchError> {
        let url = self.client.url(&[&self.name, "_find"])?;
        let body = json!({ "selector": selector, "limit": limit });

        let response = self
            .client
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let found: FindResponse<T> = response.json().await?;
        Ok(found.docs)
    }

    /// Lists up to `limit` documents, skipping design documents.
    pub async fn all_docs<T: DeserializeOwned>(&self, limit: usize) -> Result<Vec<T>, CouchError> {
        let mut url = self.client.url(&[&self.name, "_all_docs"])?;
        url.query_pairs_mut()
            .append_pair("include_docs", "true")
            .append_pair("limit", &limit.to_string());

        let response = self.client.request(Method::GET, url).send().await?;
        let response = check_status(response).await?;

        // Decode rows loosely so design documents never fail the whole listing
        let listing: AllDocsResponse<Value> = response.json().await?;
        listing
            .rows
            .into_iter()
            .filter(|row| !row.id.starts_with("_design/"))
            .filter_map(|row| row.doc)
            .map(|doc| serde_json::from_value(doc).map_err(CouchError::from))
            .collect()
    }
}

/// Request body for `POST /{db}/_index`.
fn index_body(fields: &[&str], name: &str, partitioned_database: bool) -> Value {
    let mut body = json!({
        "index": { "fields": fields },
        "name": name,
        "type": "json",
    });
    if partitioned_database {
        body["partitioned"] = Value::Bool(false);
    }
    body
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CouchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let reason = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) if !body.reason.is_empty() => format!("{}: {}", body.error, body.reason),
        Ok(body) if !body.error.is_empty() => body.error,
        _ => text,
    };

    Err(CouchError::Status {
        status: status.as_u16(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_appends_segments() {
        let client = CouchClient::new("http://localhost:5984").unwrap();
        let url = client.url(&["photos", "_bulk_docs"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5984/photos/_bulk_docs");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = CouchClient::new("http://proxy.local/couch/").unwrap();
        let url = client.url(&["photos", "7:000000007"]).unwrap();
        assert_eq!(url.as_str(), "http://proxy.local/couch/photos/7:000000007");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            CouchClient::new("not a url"),
            Err(CouchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_index_body_plain_database() {
        let body = index_body(&["workspace_id"], "workspaceId-index", false);
        assert_eq!(
            body,
            json!({
                "index": { "fields": ["workspace_id"] },
                "name": "workspaceId-index",
                "type": "json",
            })
        );
    }

    #[test]
    fn test_index_body_partitioned_database_is_global() {
        let body = index_body(&["workspace_id"], "workspaceId-index", true);
        assert_eq!(body["partitioned"], Value::Bool(false));
        assert_eq!(body["index"]["fields"][0], "workspace_id");
    }

    #[test]
    fn test_bulk_doc_result_outcomes() {
        let results: Vec<BulkDocResult> = serde_json::from_str(
            r#"[
                {"ok": true, "id": "a", "rev": "1-abc"},
                {"id": "b", "error": "conflict", "reason": "Document update conflict."},
                {"id": "c", "rev": "1-def"}
            ]"#,
        )
        .unwrap();

        assert!(results[0].is_ok());
        assert!(!results[1].is_ok());
        assert!(results[2].is_ok());
    }
}
