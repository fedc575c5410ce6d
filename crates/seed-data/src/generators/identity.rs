//! Workspace identity assignment.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum zero-padding for partitioned sequence keys.
pub const MIN_PAD_WIDTH: usize = 9;

/// How generated workspaces are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityStrategy {
    /// The sequence number itself, e.g. `42`.
    Sequential,
    /// `partition:padded_sequence`, e.g. `42:000000042` with 1000 partitions.
    Partitioned { partitions: u64 },
    /// A random v4 UUID.
    Uuid,
}

impl IdentityStrategy {
    pub fn is_partitioned(&self) -> bool {
        matches!(self, IdentityStrategy::Partitioned { .. })
    }

    /// Partition a sequence number lands in, for partitioned keys.
    pub fn partition_of(&self, sequence: u64) -> Option<u64> {
        match self {
            IdentityStrategy::Partitioned { partitions } => Some(sequence % (*partitions).max(1)),
            _ => None,
        }
    }

    /// Builds the key for `sequence`. `pad_width` only affects partitioned keys.
    pub fn key_for(&self, sequence: u64, pad_width: usize) -> String {
        match self {
            IdentityStrategy::Sequential => sequence.to_string(),
            IdentityStrategy::Partitioned { partitions } => {
                let partition = sequence % (*partitions).max(1);
                format!("{partition}:{sequence:0pad_width$}")
            }
            IdentityStrategy::Uuid => Uuid::new_v4().to_string(),
        }
    }
}

/// Zero-pad width that keeps every sequence up to `max_sequence` the same length.
pub fn pad_width(max_sequence: u64) -> usize {
    let digits = max_sequence.checked_ilog10().map_or(1, |d| d as usize + 1);
    digits.max(MIN_PAD_WIDTH)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_partitioned_key_format() {
        let strategy = IdentityStrategy::Partitioned { partitions: 1000 };
        assert_eq!(strategy.key_for(42, 9), "42:000000042");
        assert_eq!(strategy.key_for(1042, 9), "42:000001042");
        assert_eq!(strategy.partition_of(1042), Some(42));
    }

    #[test]
    fn test_partitioned_keys_sort_within_partition() {
        let strategy = IdentityStrategy::Partitioned { partitions: 10 };
        let width = pad_width(10_000);
        let keys: Vec<String> = (0..10_000)
            .filter(|s| s % 10 == 3)
            .map(|s| strategy.key_for(s, width))
            .collect();

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_pad_width_grows_past_nine_digits() {
        assert_eq!(pad_width(0), MIN_PAD_WIDTH);
        assert_eq!(pad_width(999_999_999), 9);
        assert_eq!(pad_width(1_000_000_000), 10);
    }

    #[test]
    fn test_keys_unique_for_every_strategy() {
        for strategy in [
            IdentityStrategy::Sequential,
            IdentityStrategy::Partitioned { partitions: 7 },
            IdentityStrategy::Uuid,
        ] {
            let keys: HashSet<String> = (1..=500).map(|s| strategy.key_for(s, 9)).collect();
            assert_eq!(keys.len(), 500, "{strategy:?} produced duplicate keys");
        }
    }

    #[test]
    fn test_sequential_has_no_partition() {
        assert_eq!(IdentityStrategy::Sequential.key_for(7, 9), "7");
        assert_eq!(IdentityStrategy::Sequential.partition_of(7), None);
    }
}
