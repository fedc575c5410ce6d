//! Splitting a target workspace count into batches.

use serde::{Deserialize, Serialize};

/// What to do with `total % batch_size`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemainderPolicy {
    /// Write the remainder as one short final batch.
    #[default]
    ShortFinalBatch,
    /// Write only full batches and drop the remainder.
    Truncate,
}

/// Batch layout of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    total: u64,
    batch_size: usize,
    remainder: RemainderPolicy,
}

impl BatchPlan {
    /// Returns `None` when `batch_size` is zero.
    pub fn new(total: u64, batch_size: usize, remainder: RemainderPolicy) -> Option<Self> {
        (batch_size > 0).then_some(Self {
            total,
            batch_size,
            remainder,
        })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn remainder_policy(&self) -> RemainderPolicy {
        self.remainder
    }

    fn full_batches(&self) -> u64 {
        self.total / self.batch_size as u64
    }

    fn partial(&self) -> u64 {
        self.total % self.batch_size as u64
    }

    pub fn batch_count(&self) -> u64 {
        match self.remainder {
            RemainderPolicy::ShortFinalBatch => self.total.div_ceil(self.batch_size as u64),
            RemainderPolicy::Truncate => self.full_batches(),
        }
    }

    /// Workspaces the plan leaves out.
    pub fn dropped_remainder(&self) -> u64 {
        match self.remainder {
            RemainderPolicy::ShortFinalBatch => 0,
            RemainderPolicy::Truncate => self.partial(),
        }
    }

    /// Workspaces the plan will generate.
    pub fn planned_workspaces(&self) -> u64 {
        self.total - self.dropped_remainder()
    }

    /// Size of each batch, in order.
    pub fn batch_sizes(&self) -> impl Iterator<Item = usize> + use<> {
        let full = self.full_batches();
        let batch_size = self.batch_size;
        let tail = match self.remainder {
            RemainderPolicy::ShortFinalBatch if self.partial() > 0 => Some(self.partial() as usize),
            _ => None,
        };
        (0..full).map(move |_| batch_size).chain(tail)
    }
}
