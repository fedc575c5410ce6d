//! Offline, deterministic content generation.

use async_trait::async_trait;
use fake::{
    Fake,
    faker::lorem::en::{Sentences, Words},
};
use rand::{SeedableRng, rngs::StdRng};

use super::content::{ContentFetchError, ContentKind, ContentPage, ContentProvider};

/// Generates placeholder URLs and lorem text without network access.
///
/// Every page is a pure function of `(seed, kind, page)`, so two providers
/// with the same seed produce identical pools.
#[derive(Debug, Clone)]
pub struct ProceduralProvider {
    seed: u64,
    page_size: usize,
    url_pages: usize,
}

impl ProceduralProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            page_size: 250,
            url_pages: 4,
        }
    }

    /// Sets how many entries each page yields.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets how many URL pages exist before the cursor runs out.
    pub fn with_url_pages(mut self, url_pages: usize) -> Self {
        self.url_pages = url_pages.max(1);
        self
    }

    fn page_rng(&self, kind: ContentKind, page: u64) -> StdRng {
        let salt = match kind {
            ContentKind::ImageUrls => 1,
            ContentKind::DescriptionWords => 2,
            ContentKind::WorkspaceSentences => 3,
        };
        StdRng::seed_from_u64(
            self.seed
                .wrapping_mul(1_000_003)
                .wrapping_add(salt)
                .wrapping_mul(1_000_003)
                .wrapping_add(page),
        )
    }

    fn page(&self, kind: ContentKind, page: u64) -> ContentPage {
        let mut rng = self.page_rng(kind, page);
        let size = self.page_size;

        match kind {
            ContentKind::ImageUrls => {
                let start = page as usize * size;
                let items = (start..start + size)
                    .map(|n| format!("https://picsum.photos/seed/{}-{n}/1024/768", self.seed))
                    .collect();
                let next = page + 1;
                ContentPage {
                    items,
                    next_cursor: ((next as usize) < self.url_pages).then(|| next.to_string()),
                }
            }
            ContentKind::DescriptionWords => {
                let words: Vec<String> = Words(size..size + 1).fake_with_rng(&mut rng);
                ContentPage {
                    items: vec![words.join(" ")],
                    next_cursor: Some((page + 1).to_string()),
                }
            }
            ContentKind::WorkspaceSentences => {
                let sentences: Vec<String> = Sentences(size..size + 1).fake_with_rng(&mut rng);
                ContentPage {
                    items: sentences,
                    next_cursor: Some((page + 1).to_string()),
                }
            }
        }
    }
}

#[async_trait]
impl ContentProvider for ProceduralProvider {
    async fn fetch(
        &self,
        kind: ContentKind,
        cursor: Option<&str>,
    ) -> Result<ContentPage, ContentFetchError> {
        let page = match cursor {
            None => 0,
            Some(raw) => raw.parse().map_err(|_| ContentFetchError::Malformed {
                provider: "procedural",
                reason: format!("bad cursor {raw}"),
            })?,
        };
        Ok(self.page(kind, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_are_deterministic() {
        let a = ProceduralProvider::new(7).page(ContentKind::DescriptionWords, 3);
        let b = ProceduralProvider::new(7).page(ContentKind::DescriptionWords, 3);
        assert_eq!(a.items, b.items);
    }

    #[test]
    fn test_url_pages_run_out() {
        let provider = ProceduralProvider::new(1).with_page_size(5).with_url_pages(2);
        let first = provider.page(ContentKind::ImageUrls, 0);
        let last = provider.page(ContentKind::ImageUrls, 1);

        assert_eq!(first.items.len(), 5);
        assert_eq!(first.next_cursor.as_deref(), Some("1"));
        assert!(last.next_cursor.is_none());
        assert_ne!(first.items[0], last.items[0]);
    }

    #[test]
    fn test_words_page_tokenizes_to_page_size() {
        let provider = ProceduralProvider::new(9).with_page_size(40);
        let page = provider.page(ContentKind::DescriptionWords, 0);
        let words = ContentKind::DescriptionWords.tokenize(page.items);
        assert_eq!(words.len(), 40);
    }
}
