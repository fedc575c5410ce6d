//! Workspace and photo generation from a content pool.

use std::ops::RangeInclusive;

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use thiserror::Error;

use super::identity::{IdentityStrategy, pad_width};
use crate::pool::ContentPool;

/// Generated photo ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPhoto {
    pub url: String,
    pub description: String,
}

/// Generated workspace with its photos.
#[derive(Debug, Clone)]
pub struct GeneratedWorkspace {
    /// Monotonic counter; the relational `workspace_id`.
    pub sequence: u64,
    /// Identity assigned by the [`IdentityStrategy`].
    pub key: String,
    pub description: String,
    pub photos: Vec<GeneratedPhoto>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("Photo range {min}..={max} is empty")]
    EmptyPhotoRange { min: usize, max: usize },
}

/// Configuration for workspace generation.
#[derive(Debug, Clone)]
pub struct WorkspaceGenConfig {
    /// Photos per workspace, drawn uniformly.
    pub photos_per_workspace: RangeInclusive<usize>,
    pub identity: IdentityStrategy,
    /// Sequence number of the first workspace.
    pub first_sequence: u64,
    /// Largest sequence the run will reach; sizes partitioned key padding.
    pub last_sequence: u64,
}

impl Default for WorkspaceGenConfig {
    fn default() -> Self {
        Self {
            photos_per_workspace: 4..=7,
            identity: IdentityStrategy::Sequential,
            first_sequence: 1,
            last_sequence: 1,
        }
    }
}

/// Turns pooled content into workspaces.
///
/// URL, word and sentence cursors advance independently, so a workspace's
/// photos reuse content in pool order and wrap around once a pool runs out.
pub struct WorkspaceGenerator {
    pool: ContentPool,
    photo_count: Uniform<usize>,
    identity: IdentityStrategy,
    next_sequence: u64,
    pad_width: usize,
}

impl WorkspaceGenerator {
    pub fn new(pool: ContentPool, config: WorkspaceGenConfig) -> Result<Self, GeneratorError> {
        let (min, max) = (
            *config.photos_per_workspace.start(),
            *config.photos_per_workspace.end(),
        );
        if min > max {
            return Err(GeneratorError::EmptyPhotoRange { min, max });
        }

        Ok(Self {
            pool,
            photo_count: Uniform::new_inclusive(min, max),
            identity: config.identity,
            next_sequence: config.first_sequence,
            pad_width: pad_width(config.last_sequence.max(config.first_sequence)),
        })
    }

    /// Generates a single workspace.
    pub fn generate(&mut self, rng: &mut impl Rng) -> GeneratedWorkspace {
        let photo_count = self.photo_count.sample(rng);
        let photos = (0..photo_count)
            .map(|_| GeneratedPhoto {
                url: self.pool.urls.next_item().to_string(),
                description: self.pool.words.next_item().to_string(),
            })
            .collect();

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        GeneratedWorkspace {
            sequence,
            key: self.identity.key_for(sequence, self.pad_width),
            description: self.pool.sentences.next_item().to_string(),
            photos,
        }
    }

    /// Generates `count` workspaces.
    pub fn generate_batch(&mut self, count: usize, rng: &mut impl Rng) -> Vec<GeneratedWorkspace> {
        (0..count).map(|_| self.generate(rng)).collect()
    }

    /// Sequence the next workspace will get.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn pool(&self) -> &ContentPool {
        &self.pool
    }
}
