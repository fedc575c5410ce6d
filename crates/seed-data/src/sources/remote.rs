//! Combined provider over the real third-party APIs.

use async_trait::async_trait;

use super::cloudinary::CloudinaryClient;
use super::content::{ContentFetchError, ContentKind, ContentPage, ContentProvider};
use super::hipsum::HipsumClient;

/// Serves image URLs from Cloudinary and text from Hipsum.
pub struct RemoteContentProvider {
    images: CloudinaryClient,
    text: HipsumClient,
}

impl RemoteContentProvider {
    pub fn new(images: CloudinaryClient, text: HipsumClient) -> Self {
        Self { images, text }
    }
}

#[async_trait]
impl ContentProvider for RemoteContentProvider {
    async fn fetch(
        &self,
        kind: ContentKind,
        cursor: Option<&str>,
    ) -> Result<ContentPage, ContentFetchError> {
        match kind {
            ContentKind::ImageUrls => self.images.fetch(kind, cursor).await,
            ContentKind::DescriptionWords | ContentKind::WorkspaceSentences => {
                self.text.fetch(kind, cursor).await
            }
        }
    }
}
