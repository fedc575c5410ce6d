//! Storage sinks for seeding generated data.
//!
//! A [`SeedSink`] receives whole batches and owns the destination's
//! setup and teardown steps:
//! - [`PgSink`]: PostgreSQL, streamed through `COPY ... FROM STDIN`
//! - [`CouchSink`]: CouchDB, through `_bulk_docs`
//! - [`MemorySink`]: In-process recorder for tests and dry runs

mod couch;
mod memory;
mod postgres;
mod sink;

pub use couch::{CouchSink, WORKSPACE_INDEX_NAME, to_document};
pub use memory::{MemorySink, SinkEvent};
pub use postgres::{PgSink, escape_copy_text};
pub use sink::{BulkOutcome, SeedSink, SinkError};
