//! One bulk write per batch.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::{BulkOutcome, SeedSink, SinkError};
use crate::generators::GeneratedWorkspace;

/// Reaction to a failed batch write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure and continue with the next batch.
    SkipAndContinue,
    /// Stop loading; finalize still runs.
    #[default]
    AbortOnError,
}

#[derive(Debug, Error)]
#[error("Batch {batch_index} failed: {source}")]
pub struct BatchWriteError {
    pub batch_index: u64,
    #[source]
    pub source: SinkError,
}

/// Submits `records` as one bulk write.
pub async fn write_batch(
    sink: &dyn SeedSink,
    batch_index: u64,
    records: &[GeneratedWorkspace],
) -> Result<BulkOutcome, BatchWriteError> {
    debug!(batch_index, records = records.len(), sink = sink.name(), "Writing batch");

    let outcome = sink
        .bulk_insert(records)
        .await
        .map_err(|source| BatchWriteError {
            batch_index,
            source,
        })?;

    if outcome.rejected > 0 {
        warn!(
            batch_index,
            rejected = outcome.rejected,
            inserted = outcome.inserted,
            "Sink rejected records"
        );
    }
    Ok(outcome)
}
