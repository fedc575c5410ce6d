//! Hipsum placeholder text client.
//!
//! The API is unpaged: every call returns fresh text. The cursor handed back
//! is a page counter so [`ContentSource`](super::ContentSource) keeps asking
//! until its target or page cap is reached.

use async_trait::async_trait;

use super::content::{ContentFetchError, ContentKind, ContentPage, ContentProvider};

const PROVIDER: &str = "hipsum";

/// Text request sizes per call.
#[derive(Debug, Clone, Copy)]
pub struct HipsumRequest {
    /// Paragraphs per call when fetching description words.
    pub paragraphs: usize,
    /// Sentences per call when fetching workspace sentences.
    pub sentences: usize,
}

impl Default for HipsumRequest {
    fn default() -> Self {
        Self {
            paragraphs: 30,
            sentences: 100,
        }
    }
}

pub struct HipsumClient {
    client: reqwest::Client,
    base_url: String,
    request: HipsumRequest,
}

impl HipsumClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://hipsum.co".to_string(),
            request: HipsumRequest::default(),
        }
    }

    /// Sets a custom base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request(mut self, request: HipsumRequest) -> Self {
        self.request = request;
        self
    }

    fn query_for(&self, kind: ContentKind) -> Option<(&'static str, String)> {
        match kind {
            ContentKind::DescriptionWords => Some(("paras", self.request.paragraphs.to_string())),
            ContentKind::WorkspaceSentences => {
                Some(("sentences", self.request.sentences.to_string()))
            }
            ContentKind::ImageUrls => None,
        }
    }
}

impl Default for HipsumClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_text(body: &str) -> Result<Vec<String>, ContentFetchError> {
    serde_json::from_str(body).map_err(|e| ContentFetchError::Malformed {
        provider: PROVIDER,
        reason: e.to_string(),
    })
}

fn next_page(cursor: Option<&str>) -> String {
    let page: u64 = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
    (page + 1).to_string()
}

#[async_trait]
impl ContentProvider for HipsumClient {
    async fn fetch(
        &self,
        kind: ContentKind,
        cursor: Option<&str>,
    ) -> Result<ContentPage, ContentFetchError> {
        let Some((param, amount)) = self.query_for(kind) else {
            return Err(ContentFetchError::NotConfigured {
                provider: PROVIDER,
                reason: format!("cannot serve {kind}"),
            });
        };

        let url = format!("{}/api/", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[("type", "hipster-centric".to_string()), (param, amount)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ContentFetchError::Status {
                provider: PROVIDER,
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        Ok(ContentPage {
            items: parse_text(&text)?,
            next_cursor: Some(next_page(cursor)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paragraph_array() {
        let items = parse_text(r#"["Kale chips umami.", "Tofu banjo."]"#).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(
            parse_text(r#"{"error": "rate limited"}"#),
            Err(ContentFetchError::Malformed { .. })
        ));
    }

    #[test]
    fn test_page_counter_cursor() {
        assert_eq!(next_page(None), "1");
        assert_eq!(next_page(Some("4")), "5");
    }

    #[test]
    fn test_query_per_kind() {
        let client = HipsumClient::new();
        assert_eq!(
            client.query_for(ContentKind::DescriptionWords),
            Some(("paras", "30".to_string()))
        );
        assert_eq!(
            client.query_for(ContentKind::WorkspaceSentences),
            Some(("sentences", "100".to_string()))
        );
        assert_eq!(client.query_for(ContentKind::ImageUrls), None);
    }
}
