//! CouchDB sink writing one document per workspace.

use async_trait::async_trait;
use photos::couch::{BulkDocResult, CouchDatabase};
use photos::models::{PhotoInfo, WorkspaceDocument};
use tracing::{debug, info, warn};

use super::sink::{BulkOutcome, SeedSink, SinkError};
use crate::generators::GeneratedWorkspace;

/// Name of the Mango index over `workspace_id`.
pub const WORKSPACE_INDEX_NAME: &str = "workspaceId-index";

pub struct CouchSink {
    database: CouchDatabase,
    partitioned: bool,
}

impl CouchSink {
    /// `partitioned` must match the identity strategy: partitioned databases
    /// only accept `partition:docid` ids.
    pub fn new(database: CouchDatabase, partitioned: bool) -> Self {
        Self {
            database,
            partitioned,
        }
    }

    pub fn database(&self) -> &CouchDatabase {
        &self.database
    }
}

/// Converts a generated workspace into its stored document.
pub fn to_document(workspace: &GeneratedWorkspace) -> WorkspaceDocument {
    WorkspaceDocument::new(
        workspace.key.clone(),
        workspace.sequence.to_string(),
        workspace.description.clone(),
        workspace
            .photos
            .iter()
            .map(|photo| PhotoInfo {
                url: photo.url.clone(),
                description: photo.description.clone(),
            })
            .collect(),
    )
}

/// Counts per-document results. `_bulk_docs` answers in submission order;
/// docs with no result entry were not stored.
fn tally(batch: &[GeneratedWorkspace], results: &[BulkDocResult]) -> BulkOutcome {
    let mut outcome = BulkOutcome::default();
    for (workspace, result) in batch.iter().zip(results) {
        if result.is_ok() {
            outcome.inserted += 1;
            outcome.photos += workspace.photos.len();
        } else {
            outcome.rejected += 1;
            debug!(
                id = result.id.as_deref().unwrap_or_default(),
                error = result.error.as_deref().unwrap_or_default(),
                reason = result.reason.as_deref().unwrap_or_default(),
                "Document rejected"
            );
        }
    }

    let missing = batch.len().saturating_sub(results.len());
    if missing > 0 {
        warn!(missing, "Bulk response shorter than submitted batch");
        outcome.rejected += missing;
    }
    outcome
}

#[async_trait]
impl SeedSink for CouchSink {
    fn name(&self) -> &'static str {
        "couch"
    }

    async fn drop_structures(&self) -> Result<(), SinkError> {
        if !self.database.destroy().await? {
            debug!(database = self.database.name(), "Database did not exist");
        }
        Ok(())
    }

    async fn create_structures(&self) -> Result<(), SinkError> {
        self.database.create(self.partitioned).await?;
        info!(
            database = self.database.name(),
            partitioned = self.partitioned,
            "Created database"
        );
        Ok(())
    }

    async fn bulk_insert(&self, batch: &[GeneratedWorkspace]) -> Result<BulkOutcome, SinkError> {
        let docs: Vec<WorkspaceDocument> = batch.iter().map(to_document).collect();
        let results = self.database.bulk_docs(&docs).await?;
        Ok(tally(batch, &results))
    }

    async fn create_indexes(&self) -> Result<(), SinkError> {
        self.database
            .create_index(&["workspace_id"], WORKSPACE_INDEX_NAME, self.partitioned)
            .await?;
        info!(index = WORKSPACE_INDEX_NAME, "Created index");
        Ok(())
    }
}
