/// Storage roots and the raw block statistics they are measured from.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One external storage root visible to the current process.
///
/// Identity is the `path`; two roots with the same path are the same root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRoot {
    /// Absolute, canonical path of the root directory.
    pub path: PathBuf,
    /// Bytes available to unprivileged callers at the moment of the query.
    pub available_bytes: u64,
    /// Reserved for a human-readable volume name. Always `None` today.
    #[serde(default)]
    pub label: Option<String>,
}

impl StorageRoot {
    pub fn new(path: impl Into<PathBuf>, available_bytes: u64) -> Self {
        Self {
            path: path.into(),
            available_bytes,
            label: None,
        }
    }

    /// Build a root from a fresh statistics reading.
    pub fn from_stats(path: impl Into<PathBuf>, stats: &BlockStats) -> Self {
        Self::new(path, stats.available_bytes())
    }
}

/// Filesystem block statistics for a single path, as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockStats {
    /// Fundamental block size in bytes.
    pub block_size: u64,
    /// Blocks available to unprivileged callers.
    pub available_blocks: u64,
    /// Total blocks on the filesystem.
    pub total_blocks: u64,
}

impl BlockStats {
    /// `available_blocks * block_size`, saturating at `u64::MAX`.
    pub fn available_bytes(&self) -> u64 {
        self.available_blocks.saturating_mul(self.block_size)
    }

    /// `total_blocks * block_size`, saturating at `u64::MAX`.
    pub fn total_bytes(&self) -> u64 {
        self.total_blocks.saturating_mul(self.block_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_bytes_is_exact_product() {
        let stats = BlockStats {
            block_size: 4096,
            available_blocks: 1000,
            total_blocks: 2000,
        };
        assert_eq!(stats.available_bytes(), 4_096_000);
        assert_eq!(stats.total_bytes(), 8_192_000);
    }

    #[test]
    fn test_odd_block_size_is_not_rounded() {
        let stats = BlockStats {
            block_size: 513,
            available_blocks: 7,
            total_blocks: 7,
        };
        assert_eq!(stats.available_bytes(), 3591);
    }

    #[test]
    fn test_overflow_saturates() {
        let stats = BlockStats {
            block_size: u64::MAX,
            available_blocks: 2,
            total_blocks: 2,
        };
        assert_eq!(stats.available_bytes(), u64::MAX);
    }

    #[test]
    fn test_from_stats_leaves_label_empty() {
        let stats = BlockStats {
            block_size: 512,
            available_blocks: 4,
            total_blocks: 8,
        };
        let root = StorageRoot::from_stats("/storage/emulated/0", &stats);
        assert_eq!(root.available_bytes, 2048);
        assert_eq!(root.label, None);
    }
}
