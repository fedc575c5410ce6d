//! Storage backends behind the photo read API.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::{
    couch::CouchDatabase,
    errors::AppError,
    models::{Photo, WorkspaceDocument, parse_document_photo_id},
};

/// Upper bound on rows returned by a full listing.
pub const MAX_LISTED_PHOTOS: usize = 1000;

/// Read access to stored photos.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Lists photos, at most [`MAX_LISTED_PHOTOS`].
    async fn all_photos(&self) -> Result<Vec<Photo>, AppError>;

    /// Fetches a single photo by its API id.
    async fn photo_by_id(&self, id: &str) -> Result<Option<Photo>, AppError>;

    /// Lists the photos owned by one workspace.
    async fn photos_by_workspace(&self, workspace_id: &str) -> Result<Vec<Photo>, AppError>;
}

pub type SharedStore = Arc<dyn PhotoStore>;

/// Photo store over CouchDB workspace documents.
#[derive(Clone)]
pub struct CouchPhotoStore {
    db: CouchDatabase,
}

impl CouchPhotoStore {
    pub fn new(db: CouchDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PhotoStore for CouchPhotoStore {
    async fn all_photos(&self) -> Result<Vec<Photo>, AppError> {
        // Seeded workspaces hold at least one photo, so this many docs covers the cap
        let docs: Vec<WorkspaceDocument> = self.db.all_docs(MAX_LISTED_PHOTOS).await?;
        let mut photos: Vec<Photo> = docs
            .into_iter()
            .flat_map(WorkspaceDocument::into_photos)
            .collect();
        photos.truncate(MAX_LISTED_PHOTOS);
        Ok(photos)
    }

    async fn photo_by_id(&self, id: &str) -> Result<Option<Photo>, AppError> {
        let Some((doc_id, index)) = parse_document_photo_id(id) else {
            return Err(AppError::InvalidInput(format!("Malformed photo id: {id}")));
        };

        let doc: Option<WorkspaceDocument> = self.db.get(doc_id).await?;
        Ok(doc.and_then(|doc| doc.into_photos().into_iter().nth(index)))
    }

    async fn photos_by_workspace(&self, workspace_id: &str) -> Result<Vec<Photo>, AppError> {
        let docs: Vec<WorkspaceDocument> = self
            .db
            .find(json!({ "workspace_id": workspace_id }), MAX_LISTED_PHOTOS)
            .await?;
        Ok(docs
            .into_iter()
            .flat_map(WorkspaceDocument::into_photos)
            .collect())
    }
}
