/// Storage inventory: the three read-only storage queries.
///
/// `StorageInventory` owns nothing but its backend. Every query goes
/// straight to the OS; there is no cache, so two calls may legitimately
/// disagree when something else on the device is writing.
use crate::config::Config;
use crate::error::InventoryError;
use crate::model::{BlockStats, PlatformInfo, StorageRoot};
use crate::platform::{NativeBackend, StorageBackend};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct StorageInventory<B> {
    backend: B,
}

/// A root together with the filesystem capacity measured alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootUsage {
    #[serde(flatten)]
    pub root: StorageRoot,
    pub total_bytes: u64,
}

/// Everything the inventory knows, measured in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub platform: PlatformInfo,
    pub full_storage_access: bool,
    pub roots: Vec<RootUsage>,
}

impl StorageInventory<NativeBackend> {
    /// Inventory backed by the OS this binary was built for.
    pub fn native(config: &Config) -> Self {
        Self::new(NativeBackend::from_config(config))
    }
}

impl<B: StorageBackend> StorageInventory<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Platform family and OS release. Never fails; an unreportable
    /// version becomes a placeholder.
    pub fn get_platform_info(&self) -> PlatformInfo {
        PlatformInfo::new(self.backend.platform_name(), self.backend.os_version())
    }

    /// Whether the process may manage all files on the device.
    pub fn is_full_storage_access_granted(&self) -> bool {
        self.backend.full_storage_access()
    }

    /// Every storage root the OS exposes to this process, with its free
    /// space measured now.
    ///
    /// Roots that cannot be resolved or measured (media pulled mid-call)
    /// are left out. Only a failure of the listing itself is an error.
    pub fn enumerate_external_storage_roots(&self) -> Result<Vec<StorageRoot>, InventoryError> {
        Ok(self
            .measure_roots()?
            .into_iter()
            .map(|(path, stats)| StorageRoot::from_stats(path, &stats))
            .collect())
    }

    /// Same roots as [`enumerate_external_storage_roots`](Self::enumerate_external_storage_roots),
    /// each with the capacity of its filesystem.
    pub fn root_usage(&self) -> Result<Vec<RootUsage>, InventoryError> {
        Ok(self
            .measure_roots()?
            .into_iter()
            .map(|(path, stats)| RootUsage {
                root: StorageRoot::from_stats(path, &stats),
                total_bytes: stats.total_bytes(),
            })
            .collect())
    }

    /// Platform, access flag and roots with capacity, stamped with the time
    /// the measurement started.
    pub fn snapshot(&self) -> Result<Snapshot, InventoryError> {
        let taken_at = Utc::now();
        let platform = self.get_platform_info();
        let full_storage_access = self.is_full_storage_access_granted();
        let roots = self.root_usage()?;

        Ok(Snapshot {
            taken_at,
            platform,
            full_storage_access,
            roots,
        })
    }

    fn measure_roots(&self) -> Result<Vec<(PathBuf, BlockStats)>, InventoryError> {
        let dirs = self
            .backend
            .storage_dirs()
            .map_err(|source| InventoryError::Enumeration { source })?;
        debug!("OS reported {} storage directories", dirs.len());

        let mut seen = HashSet::with_capacity(dirs.len());
        let mut measured = Vec::with_capacity(dirs.len());

        for dir in dirs {
            let path = match self.backend.resolve(&dir) {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping {}: cannot resolve path: {e}", dir.display());
                    continue;
                }
            };

            if !seen.insert(path.clone()) {
                debug!("Skipping duplicate root {}", path.display());
                continue;
            }

            match self.backend.block_stats(&path) {
                Ok(stats) => {
                    debug!(
                        "{}: {} blocks of {} bytes available",
                        path.display(),
                        stats.available_blocks,
                        stats.block_size
                    );
                    measured.push((path, stats));
                }
                Err(e) => warn!("Skipping {}: statistics unavailable: {e}", path.display()),
            }
        }

        Ok(measured)
    }
}
