//! Storage sink abstraction for bulk seeding.

use async_trait::async_trait;
use photos::couch::CouchError;
use thiserror::Error;

use crate::generators::GeneratedWorkspace;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Document store error: {0}")]
    Couch(#[from] CouchError),
    #[error("Injected failure: {0}")]
    Injected(String),
}

/// Per-record result of one bulk write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Workspaces the sink accepted.
    pub inserted: usize,
    /// Workspaces the sink refused individually.
    pub rejected: usize,
    /// Photos belonging to the accepted workspaces.
    pub photos: usize,
}

/// Destination of a seeding run.
///
/// Each method is one phase step. Implementations acquire whatever
/// connection they need inside the call and release it before returning.
#[async_trait]
pub trait SeedSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Removes destination structures. Missing structures are not an error.
    async fn drop_structures(&self) -> Result<(), SinkError>;

    /// Creates fresh destination structures.
    async fn create_structures(&self) -> Result<(), SinkError>;

    /// Trades durability for load throughput until [`restore_durability`](Self::restore_durability).
    async fn relax_durability(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Writes one batch in a single bulk operation.
    async fn bulk_insert(&self, batch: &[GeneratedWorkspace]) -> Result<BulkOutcome, SinkError>;

    async fn restore_durability(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Builds secondary indexes for the query paths the API uses.
    async fn create_indexes(&self) -> Result<(), SinkError>;
}

#[async_trait]
impl<S: SeedSink + ?Sized> SeedSink for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn drop_structures(&self) -> Result<(), SinkError> {
        (**self).drop_structures().await
    }

    async fn create_structures(&self) -> Result<(), SinkError> {
        (**self).create_structures().await
    }

    async fn relax_durability(&self) -> Result<(), SinkError> {
        (**self).relax_durability().await
    }

    async fn bulk_insert(&self, batch: &[GeneratedWorkspace]) -> Result<BulkOutcome, SinkError> {
        (**self).bulk_insert(batch).await
    }

    async fn restore_durability(&self) -> Result<(), SinkError> {
        (**self).restore_durability().await
    }

    async fn create_indexes(&self) -> Result<(), SinkError> {
        (**self).create_indexes().await
    }
}
