//! Content acquisition for seed generation.
//!
//! This module provides the content pipeline's data sources:
//! - [`ContentSource`]: Drains a provider page by page into a [`ContentPool`](crate::pool::ContentPool)
//! - [`RemoteContentProvider`]: Stock photos from Cloudinary, text from Hipsum
//! - [`ProceduralProvider`]: Deterministic offline content

mod cloudinary;
mod content;
mod hipsum;
mod procedural;
mod remote;

pub use cloudinary::CloudinaryClient;
pub use content::{
    ContentFetchError, ContentKind, ContentPage, ContentProvider, ContentSource, ContentTargets,
    DEFAULT_MAX_PAGES,
};
pub use hipsum::{HipsumClient, HipsumRequest};
pub use procedural::ProceduralProvider;
pub use remote::RemoteContentProvider;
