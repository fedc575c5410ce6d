//! Paginated content fetching into fully materialized pools.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pool::{ContentPool, CyclicPool};

/// Default hard cap on pages fetched per content kind.
pub const DEFAULT_MAX_PAGES: usize = 7;

/// Kinds of content the pipeline draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Stock photo URLs.
    ImageUrls,
    /// Single words used as photo descriptions.
    DescriptionWords,
    /// Sentences used as workspace descriptions.
    WorkspaceSentences,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::ImageUrls => "image urls",
            ContentKind::DescriptionWords => "description words",
            ContentKind::WorkspaceSentences => "workspace sentences",
        };
        f.write_str(name)
    }
}

impl ContentKind {
    /// Splits raw provider items into pool entries, dropping empty ones.
    pub fn tokenize(self, items: Vec<String>) -> Vec<String> {
        match self {
            ContentKind::ImageUrls => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            ContentKind::DescriptionWords => items
                .iter()
                .flat_map(|item| item.split_whitespace())
                .map(str::to_string)
                .collect(),
            ContentKind::WorkspaceSentences => items
                .iter()
                .flat_map(|item| item.split('.'))
                .map(str::trim)
                .filter(|sentence| !sentence.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContentFetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },
    #[error("{provider} returned malformed data: {reason}")]
    Malformed {
        provider: &'static str,
        reason: String,
    },
    #[error("{provider} is not configured: {reason}")]
    NotConfigured {
        provider: &'static str,
        reason: String,
    },
    #[error("No {0} were fetched")]
    Empty(ContentKind),
}

/// One page of provider output.
#[derive(Debug, Clone, Default)]
pub struct ContentPage {
    pub items: Vec<String>,
    /// Cursor for the next page; `None` or empty means end of data.
    pub next_cursor: Option<String>,
}

/// External provider of raw content.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch(
        &self,
        kind: ContentKind,
        cursor: Option<&str>,
    ) -> Result<ContentPage, ContentFetchError>;
}

#[async_trait]
impl<P: ContentProvider + ?Sized> ContentProvider for Box<P> {
    async fn fetch(
        &self,
        kind: ContentKind,
        cursor: Option<&str>,
    ) -> Result<ContentPage, ContentFetchError> {
        (**self).fetch(kind, cursor).await
    }
}

/// Minimum entries to collect per text kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContentTargets {
    pub words: usize,
    pub sentences: usize,
}

impl Default for ContentTargets {
    fn default() -> Self {
        Self {
            words: 1700,
            sentences: 1700,
        }
    }
}

/// Drains a [`ContentProvider`] page by page.
pub struct ContentSource<P> {
    provider: P,
    max_pages: usize,
}

impl<P: ContentProvider> ContentSource<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Sets the hard page cap. Values below 1 are treated as 1.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Fetches every item of `kind`, stopping at end of data, at `target`
    /// entries, or at the page cap, whichever comes first.
    pub async fn fetch_all(
        &self,
        kind: ContentKind,
        target: Option<usize>,
    ) -> Result<Vec<String>, ContentFetchError> {
        let mut collected = Vec::new();
        let mut cursor: Option<String> = None;

        for page_number in 1..=self.max_pages {
            let page = self.provider.fetch(kind, cursor.as_deref()).await?;
            collected.extend(kind.tokenize(page.items));
            debug!(%kind, page = page_number, collected = collected.len(), "Fetched content page");

            if target.is_some_and(|target| collected.len() >= target) {
                cursor = None;
                break;
            }

            cursor = page.next_cursor.filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        if cursor.is_some() {
            warn!(
                %kind,
                max_pages = self.max_pages,
                collected = collected.len(),
                "Page cap reached with more content available, keeping what was fetched"
            );
        }

        if collected.is_empty() {
            return Err(ContentFetchError::Empty(kind));
        }

        info!("Got {} {kind}", collected.len());
        Ok(collected)
    }

    /// Fetches all three content kinds into a pool.
    pub async fn fetch_pool(&self, targets: ContentTargets) -> Result<ContentPool, ContentFetchError> {
        let urls = self.fetch_all(ContentKind::ImageUrls, None).await?;
        let words = self
            .fetch_all(ContentKind::DescriptionWords, Some(targets.words))
            .await?;
        let sentences = self
            .fetch_all(ContentKind::WorkspaceSentences, Some(targets.sentences))
            .await?;

        Ok(ContentPool {
            urls: CyclicPool::new(urls).ok_or(ContentFetchError::Empty(ContentKind::ImageUrls))?,
            words: CyclicPool::new(words)
                .ok_or(ContentFetchError::Empty(ContentKind::DescriptionWords))?,
            sentences: CyclicPool::new(sentences)
                .ok_or(ContentFetchError::Empty(ContentKind::WorkspaceSentences))?,
        })
    }
}
