//! Cloudinary Admin API client for stock photo URLs.

use async_trait::async_trait;
use serde::Deserialize;

use super::content::{ContentFetchError, ContentKind, ContentPage, ContentProvider};

const PROVIDER: &str = "cloudinary";

/// Largest page the Admin API serves.
pub const MAX_RESULTS_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
struct ResourcesResponse {
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    secure_url: Option<String>,
}

/// Lists uploaded images under a folder prefix.
pub struct CloudinaryClient {
    client: reqwest::Client,
    endpoint: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    prefix: String,
    max_results: usize,
}

impl CloudinaryClient {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: "https://api.cloudinary.com".to_string(),
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            prefix: String::new(),
            max_results: MAX_RESULTS_LIMIT,
        }
    }

    /// Only lists images whose public id starts with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the page size, clamped to the API limit.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, MAX_RESULTS_LIMIT);
        self
    }

    /// Sets a custom API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn resources_url(&self) -> String {
        format!(
            "{}/v1_1/{}/resources/image/upload",
            self.endpoint.trim_end_matches('/'),
            self.cloud_name
        )
    }

    async fn list_page(&self, cursor: Option<&str>) -> Result<ContentPage, ContentFetchError> {
        let mut query = vec![
            ("max_results", self.max_results.to_string()),
            ("type", "upload".to_string()),
        ];
        if !self.prefix.is_empty() {
            query.push(("prefix", self.prefix.clone()));
        }
        if let Some(cursor) = cursor {
            query.push(("next_cursor", cursor.to_string()));
        }

        let response = self
            .client
            .get(self.resources_url())
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ContentFetchError::Status {
                provider: PROVIDER,
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        parse_resources(&text)
    }
}

fn parse_resources(body: &str) -> Result<ContentPage, ContentFetchError> {
    let parsed: ResourcesResponse =
        serde_json::from_str(body).map_err(|e| ContentFetchError::Malformed {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;

    let items = parsed
        .resources
        .into_iter()
        .filter_map(|resource| resource.url.or(resource.secure_url))
        .collect();

    Ok(ContentPage {
        items,
        next_cursor: parsed.next_cursor,
    })
}

#[async_trait]
impl ContentProvider for CloudinaryClient {
    async fn fetch(
        &self,
        kind: ContentKind,
        cursor: Option<&str>,
    ) -> Result<ContentPage, ContentFetchError> {
        match kind {
            ContentKind::ImageUrls => self.list_page(cursor).await,
            other => Err(ContentFetchError::NotConfigured {
                provider: PROVIDER,
                reason: format!("cannot serve {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resources_page() {
        let page = parse_resources(
            r#"{
                "resources": [
                    {"public_id": "a", "url": "http://res.cloudinary.com/demo/a.jpg"},
                    {"public_id": "b", "secure_url": "https://res.cloudinary.com/demo/b.jpg"},
                    {"public_id": "c"}
                ],
                "next_cursor": "8edbc61040178db60b0973ca9494bf3a"
            }"#,
        )
        .unwrap();

        assert_eq!(
            page.items,
            vec![
                "http://res.cloudinary.com/demo/a.jpg",
                "https://res.cloudinary.com/demo/b.jpg"
            ]
        );
        assert_eq!(
            page.next_cursor.as_deref(),
            Some("8edbc61040178db60b0973ca9494bf3a")
        );
    }

    #[test]
    fn test_last_page_has_no_cursor() {
        let page = parse_resources(r#"{"resources": []}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_malformed_body() {
        let err = parse_resources("<html>busy</html>").unwrap_err();
        assert!(matches!(err, ContentFetchError::Malformed { .. }));
    }

    #[test]
    fn test_max_results_clamped() {
        let client = CloudinaryClient::new("demo", "key", "secret").with_max_results(1700);
        assert_eq!(client.max_results, MAX_RESULTS_LIMIT);
        assert_eq!(
            client.resources_url(),
            "https://api.cloudinary.com/v1_1/demo/resources/image/upload"
        );
    }
}
