//! Structure setup before loading and hardening after.

use tracing::{error, info};

use crate::db::{SeedSink, SinkError};

/// Drops, recreates and relaxes durability on the sink's structures.
pub async fn prepare(sink: &dyn SeedSink) -> Result<(), SinkError> {
    sink.drop_structures().await?;
    sink.create_structures().await?;
    sink.relax_durability().await?;
    info!(sink = sink.name(), "Prepared structures for loading");
    Ok(())
}

/// Restores durability, then builds indexes.
///
/// Both steps run even if the first fails. Every failure is logged and the
/// first one is returned.
pub async fn finalize(sink: &dyn SeedSink) -> Result<(), SinkError> {
    let restored = sink.restore_durability().await;
    if let Err(e) = &restored {
        error!(sink = sink.name(), "Failed to restore durability: {e}");
    }

    let indexed = sink.create_indexes().await;
    if let Err(e) = &indexed {
        error!(sink = sink.name(), "Failed to create indexes: {e}");
    }

    restored.and(indexed)?;
    info!(sink = sink.name(), "Finalized structures");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemorySink, SinkEvent};

    #[tokio::test]
    async fn test_prepare_order() {
        let sink = MemorySink::new();
        prepare(&sink).await.unwrap();
        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Dropped,
                SinkEvent::Created,
                SinkEvent::DurabilityRelaxed
            ]
        );
    }

    #[tokio::test]
    async fn test_prepare_failure_stops_early() {
        let sink = MemorySink::new().failing_prepare();
        assert!(prepare(&sink).await.is_err());
        assert_eq!(sink.events(), vec![SinkEvent::Dropped]);
    }

    #[tokio::test]
    async fn test_finalize_with_no_batches() {
        let sink = MemorySink::new();
        finalize(&sink).await.unwrap();
        assert_eq!(
            sink.events(),
            vec![SinkEvent::DurabilityRestored, SinkEvent::IndexesCreated]
        );
    }

    #[tokio::test]
    async fn test_finalize_attempts_indexes_after_restore_failure() {
        let sink = MemorySink::new().failing_restore().failing_indexes();
        let err = finalize(&sink).await.unwrap_err();

        assert!(matches!(err, SinkError::Injected(ref step) if step == "restore_durability"));
        assert_eq!(
            sink.events(),
            vec![SinkEvent::DurabilityRestored, SinkEvent::IndexesCreated]
        );
    }
}
