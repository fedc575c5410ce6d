//! In-memory sink for tests and dry runs.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use super::sink::{BulkOutcome, SeedSink, SinkError};
use crate::generators::GeneratedWorkspace;

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Dropped,
    Created,
    DurabilityRelaxed,
    BulkInsert { records: usize },
    DurabilityRestored,
    IndexesCreated,
}

#[derive(Default)]
struct MemoryState {
    events: Vec<SinkEvent>,
    workspaces: Vec<GeneratedWorkspace>,
    insert_calls: usize,
    largest_batch: usize,
}

/// Records every call and, unless in dry-run mode, keeps inserted workspaces.
///
/// Failures can be injected per phase. Keys registered with `rejecting_key` are
/// reported as per-record rejections rather than a failed call.
#[derive(Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
    failing_inserts: HashSet<usize>,
    fail_prepare: bool,
    fail_restore: bool,
    fail_indexes: bool,
    rejected_keys: HashSet<String>,
    dry_run: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that counts writes without keeping records.
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Fails the `call_index`-th (zero-based) `bulk_insert` call.
    pub fn failing_insert(mut self, call_index: usize) -> Self {
        self.failing_inserts.insert(call_index);
        self
    }

    /// Fails `create_structures`.
    pub fn failing_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }

    pub fn failing_restore(mut self) -> Self {
        self.fail_restore = true;
        self
    }

    pub fn failing_indexes(mut self) -> Self {
        self.fail_indexes = true;
        self
    }

    /// Rejects the workspace with this key individually.
    pub fn rejecting_key(mut self, key: impl Into<String>) -> Self {
        self.rejected_keys.insert(key.into());
        self
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, event: SinkEvent) {
        self.state().events.push(event);
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.state().events.clone()
    }

    /// Workspaces stored so far, in insertion order. Always empty in dry-run mode.
    pub fn workspaces(&self) -> Vec<GeneratedWorkspace> {
        self.state().workspaces.clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.state().insert_calls
    }

    /// Size of the largest batch seen by `bulk_insert`.
    pub fn largest_batch(&self) -> usize {
        self.state().largest_batch
    }
}

#[async_trait]
impl SeedSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn drop_structures(&self) -> Result<(), SinkError> {
        let mut state = self.state();
        state.workspaces.clear();
        state.events.push(SinkEvent::Dropped);
        Ok(())
    }

    async fn create_structures(&self) -> Result<(), SinkError> {
        if self.fail_prepare {
            return Err(SinkError::Injected("create_structures".to_string()));
        }
        self.record(SinkEvent::Created);
        Ok(())
    }

    async fn relax_durability(&self) -> Result<(), SinkError> {
        self.record(SinkEvent::DurabilityRelaxed);
        Ok(())
    }

    async fn bulk_insert(&self, batch: &[GeneratedWorkspace]) -> Result<BulkOutcome, SinkError> {
        let mut state = self.state();
        let call_index = state.insert_calls;
        state.insert_calls += 1;
        state.largest_batch = state.largest_batch.max(batch.len());
        state.events.push(SinkEvent::BulkInsert {
            records: batch.len(),
        });

        if self.failing_inserts.contains(&call_index) {
            return Err(SinkError::Injected(format!("bulk_insert call {call_index}")));
        }

        let mut outcome = BulkOutcome::default();
        for workspace in batch {
            if self.rejected_keys.contains(&workspace.key) {
                outcome.rejected += 1;
                continue;
            }
            outcome.inserted += 1;
            outcome.photos += workspace.photos.len();
            if !self.dry_run {
                state.workspaces.push(workspace.clone());
            }
        }

        debug!(call_index, inserted = outcome.inserted, "Memory bulk insert");
        Ok(outcome)
    }

    async fn restore_durability(&self) -> Result<(), SinkError> {
        self.record(SinkEvent::DurabilityRestored);
        if self.fail_restore {
            return Err(SinkError::Injected("restore_durability".to_string()));
        }
        Ok(())
    }

    async fn create_indexes(&self) -> Result<(), SinkError> {
        self.record(SinkEvent::IndexesCreated);
        if self.fail_indexes {
            return Err(SinkError::Injected("create_indexes".to_string()));
        }
        Ok(())
    }
}
