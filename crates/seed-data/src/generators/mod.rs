//! Entity generators for seed data.
//!
//! - [`WorkspaceGenerator`]: Build workspaces and their photos from a content pool
//! - [`IdentityStrategy`]: Sequential, partitioned, or UUID workspace keys

pub mod identity;
pub mod workspace;

pub use identity::{IdentityStrategy, pad_width};
pub use workspace::{
    GeneratedPhoto, GeneratedWorkspace, GeneratorError, WorkspaceGenConfig, WorkspaceGenerator,
};
