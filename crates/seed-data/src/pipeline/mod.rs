//! The bulk seeding pipeline.
//!
//! A run fetches content once, prepares the sink, then generates and writes
//! one batch at a time. Only the current batch is held in memory. Finalize
//! runs after the load loop however it ended.
//!
//! - [`BatchPlan`]: how many batches of which size
//! - [`write_batch`]: one bulk write, with [`FailurePolicy`] deciding what a failure means
//! - [`schema::prepare`] / [`schema::finalize`]: structure lifecycle around the load
//! - [`ProgressTracker`]: 25/50/75/100 percent milestones

pub mod plan;
pub mod progress;
pub mod schema;
pub mod writer;

use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::ConfigError;
use crate::db::{SeedSink, SinkError};
use crate::generators::{GeneratorError, WorkspaceGenConfig, WorkspaceGenerator};
use crate::sources::{ContentFetchError, ContentProvider, ContentSource, ContentTargets};

pub use plan::{BatchPlan, RemainderPolicy};
pub use progress::{PROGRESS_THRESHOLDS, ProgressTracker};
pub use writer::{BatchWriteError, FailurePolicy, write_batch};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Content fetch failed: {0}")]
    ContentFetch(#[from] ContentFetchError),
    #[error("Schema preparation failed: {0}")]
    SchemaPrep(#[source] SinkError),
    #[error("Batch {batch_index} failed after {workspaces_written} workspaces were written: {source}")]
    BatchWrite {
        batch_index: u64,
        workspaces_written: u64,
        #[source]
        source: SinkError,
    },
    #[error("Finalize failed after {workspaces_written} workspaces were written: {source}")]
    Finalize {
        workspaces_written: u64,
        #[source]
        source: SinkError,
    },
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub batches_planned: u64,
    pub batches_written: u64,
    pub batches_failed: u64,
    /// Workspaces the sink accepted.
    pub workspaces_written: u64,
    /// Photos of the workspaces the sink accepted.
    pub photos_written: u64,
    pub records_rejected: u64,
    /// Workspaces left out by [`RemainderPolicy::Truncate`].
    pub dropped_remainder: u64,
    pub elapsed: Duration,
}

impl SeedReport {
    fn headline(sink: &str, aborted: bool) -> String {
        if aborted {
            format!("Seed aborted on {sink}")
        } else {
            format!("Seed completed on {sink}!")
        }
    }

    fn log_summary(&self, sink: &str, aborted: bool) {
        info!("{}", Self::headline(sink, aborted));
        info!(
            "  Batches: {}/{} written, {} failed",
            self.batches_written, self.batches_planned, self.batches_failed
        );
        info!("  Workspaces: {}", self.workspaces_written);
        info!("  Photos: {}", self.photos_written);
        if self.records_rejected > 0 {
            info!("  Rejected: {}", self.records_rejected);
        }
        if self.dropped_remainder > 0 {
            info!("  Dropped remainder: {}", self.dropped_remainder);
        }
        info!("  Elapsed: {:.1?}", self.elapsed);
    }
}

/// Runs a seeding plan against one sink.
pub struct Seeder<S> {
    sink: S,
    plan: BatchPlan,
    failure_policy: FailurePolicy,
    generator: WorkspaceGenConfig,
    targets: ContentTargets,
}

impl<S: SeedSink> Seeder<S> {
    pub fn new(sink: S, plan: BatchPlan) -> Self {
        Self {
            sink,
            plan,
            failure_policy: FailurePolicy::default(),
            generator: WorkspaceGenConfig::default(),
            targets: ContentTargets::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets photo range, identity and first sequence. The last sequence is
    /// derived from the plan.
    pub fn with_generator(mut self, config: WorkspaceGenConfig) -> Self {
        self.generator = config;
        self
    }

    pub fn with_content_targets(mut self, targets: ContentTargets) -> Self {
        self.targets = targets;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Fetches content, prepares the sink, loads every planned batch and finalizes.
    pub async fn run<P: ContentProvider>(
        &self,
        source: &ContentSource<P>,
        rng: &mut impl Rng,
    ) -> Result<SeedReport, SeedError> {
        let started = Instant::now();
        let plan = self.plan;
        let mut report = SeedReport {
            batches_planned: plan.batch_count(),
            dropped_remainder: plan.dropped_remainder(),
            ..SeedReport::default()
        };

        info!(
            sink = self.sink.name(),
            total = plan.total(),
            batch_size = plan.batch_size(),
            batches = report.batches_planned,
            "Planning seed run"
        );
        if report.dropped_remainder > 0 {
            warn!(
                dropped = report.dropped_remainder,
                "Total is not a multiple of the batch size, remainder will not be written"
            );
        }

        let pool = source.fetch_pool(self.targets).await?;

        let config = WorkspaceGenConfig {
            last_sequence: self.generator.first_sequence
                + plan.planned_workspaces().saturating_sub(1),
            ..self.generator.clone()
        };
        let mut generator = WorkspaceGenerator::new(pool, config)?;

        schema::prepare(&self.sink).await.map_err(SeedError::SchemaPrep)?;

        let mut progress = ProgressTracker::new(plan.planned_workspaces());
        let mut aborted: Option<BatchWriteError> = None;

        for (batch_index, size) in (0u64..).zip(plan.batch_sizes()) {
            let batch = generator.generate_batch(size, rng);

            match write_batch(&self.sink, batch_index, &batch).await {
                Ok(outcome) => {
                    report.batches_written += 1;
                    report.workspaces_written += outcome.inserted as u64;
                    report.records_rejected += outcome.rejected as u64;
                    report.photos_written += outcome.photos as u64;
                }
                Err(e) => {
                    report.batches_failed += 1;
                    error!(
                        batch_index,
                        workspaces_written = report.workspaces_written,
                        policy = ?self.failure_policy,
                        "Batch write failed: {}",
                        e.source
                    );
                    if self.failure_policy == FailurePolicy::AbortOnError {
                        aborted = Some(e);
                        break;
                    }
                }
            }

            progress.advance_and_log(size as u64);
        }

        let finalized = schema::finalize(&self.sink).await;

        report.elapsed = started.elapsed();
        report.log_summary(self.sink.name(), aborted.is_some());

        if let Some(e) = aborted {
            if let Err(finalize_error) = finalized {
                warn!("Finalize also failed after abort: {finalize_error}");
            }
            return Err(SeedError::BatchWrite {
                batch_index: e.batch_index,
                workspaces_written: report.workspaces_written,
                source: e.source,
            });
        }

        finalized.map_err(|source| SeedError::Finalize {
            workspaces_written: report.workspaces_written,
            source,
        })?;

        Ok(report)
    }
}
