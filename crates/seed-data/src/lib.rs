//! Bulk seed data for the photos service.
//!
//! This crate fetches stock photo URLs and placeholder text once, then
//! generates millions of workspaces with photos and writes them in bounded
//! batches to PostgreSQL or CouchDB.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let plan = BatchPlan::new(20, 5, RemainderPolicy::ShortFinalBatch).unwrap();
//! let source = ContentSource::new(ProceduralProvider::new(42));
//!
//! let report = Seeder::new(MemorySink::new(), plan)
//!     .with_failure_policy(FailurePolicy::SkipAndContinue)
//!     .run(&source, &mut rng)
//!     .await?;
//! ```

pub mod config;
pub mod db;
pub mod generators;
pub mod pipeline;
pub mod pool;
pub mod sources;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{ContentMode, SeedConfig, SinkKind};
    pub use crate::db::{BulkOutcome, CouchSink, MemorySink, PgSink, SeedSink, SinkError};
    pub use crate::generators::{
        GeneratedPhoto, GeneratedWorkspace, IdentityStrategy, WorkspaceGenConfig,
        WorkspaceGenerator,
    };
    pub use crate::pipeline::{
        BatchPlan, FailurePolicy, ProgressTracker, RemainderPolicy, SeedError, SeedReport, Seeder,
    };
    pub use crate::pool::{ContentPool, CyclicPool};
    pub use crate::sources::{
        CloudinaryClient, ContentProvider, ContentSource, ContentTargets, HipsumClient,
        ProceduralProvider, RemoteContentProvider,
    };
}
