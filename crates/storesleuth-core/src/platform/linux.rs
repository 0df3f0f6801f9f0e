/// Linux storage backend.
///
/// Roots are, in order: configured extra roots, the home directory, then
/// every removable-media mount point found in the mount table.
use super::{mounts, statvfs, StorageBackend};
use crate::config::Config;
use crate::model::BlockStats;
use std::ffi::CStr;
use std::io;
use std::mem::MaybeUninit;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LinuxBackend {
    extra_roots: Vec<PathBuf>,
    include_home: bool,
    mount_prefixes: Vec<PathBuf>,
    mount_table: PathBuf,
}

impl LinuxBackend {
    pub fn from_config(config: &Config) -> Self {
        Self {
            extra_roots: config.extra_roots.clone(),
            include_home: config.include_home,
            mount_prefixes: config.mount_prefixes.clone(),
            mount_table: PathBuf::from(mounts::MOUNT_TABLE),
        }
    }

    /// Read mounts from `path` instead of `/proc/self/mounts`.
    pub fn with_mount_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.mount_table = path.into();
        self
    }
}

impl Default for LinuxBackend {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl StorageBackend for LinuxBackend {
    fn platform_name(&self) -> &'static str {
        "Linux"
    }

    fn os_version(&self) -> Option<String> {
        kernel_release()
    }

    fn full_storage_access(&self) -> bool {
        true
    }

    fn storage_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let mut roots = self.extra_roots.clone();

        if self.include_home {
            match dirs::home_dir() {
                Some(home) => roots.push(home),
                None => tracing::debug!("No home directory; skipping home root"),
            }
        }

        if !self.mount_prefixes.is_empty() {
            let table = std::fs::read(&self.mount_table)?;
            roots.extend(mounts::mount_points_under(&table, &self.mount_prefixes));
        }

        Ok(roots)
    }

    fn block_stats(&self, path: &Path) -> io::Result<BlockStats> {
        statvfs::block_stats(path)
    }
}

/// Kernel release from `uname(2)`, e.g. `6.8.0-45-generic`.
fn kernel_release() -> Option<String> {
    let mut uts = MaybeUninit::<libc::utsname>::zeroed();
    if unsafe { libc::uname(uts.as_mut_ptr()) } != 0 {
        tracing::warn!("uname failed: {}", io::Error::last_os_error());
        return None;
    }
    let uts = unsafe { uts.assume_init() };
    let release = unsafe { CStr::from_ptr(uts.release.as_ptr()) };
    Some(release.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn isolated_config(extra: Vec<PathBuf>, prefixes: Vec<PathBuf>) -> Config {
        Config {
            extra_roots: extra,
            include_home: false,
            mount_prefixes: prefixes,
        }
    }

    #[test]
    fn test_kernel_release_is_reported() {
        let release = LinuxBackend::default().os_version().unwrap();
        assert!(!release.is_empty());
    }

    #[test]
    fn test_mounts_follow_extra_roots() {
        let tmp = TempDir::new().unwrap();
        let table = tmp.path().join("mounts");
        std::fs::write(
            &table,
            "/dev/sda1 /media/usb vfat rw 0 0\n/dev/sda2 /home ext4 rw 0 0\n",
        )
        .unwrap();

        let backend = LinuxBackend::from_config(&isolated_config(
            vec![PathBuf::from("/srv/extra")],
            vec![PathBuf::from("/media")],
        ))
        .with_mount_table(&table);

        assert_eq!(
            backend.storage_dirs().unwrap(),
            vec![PathBuf::from("/srv/extra"), PathBuf::from("/media/usb")]
        );
    }

    #[test]
    fn test_non_utf8_mount_point_is_measured() {
        use crate::inventory::StorageInventory;
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let media = tmp.path().canonicalize().unwrap();
        let card = media.join(OsStr::from_bytes(b"caf\xE9"));
        std::fs::create_dir(&card).unwrap();

        let mut table = b"/dev/sda2 /home/\xFF ext4 rw 0 0\n/dev/sde1 ".to_vec();
        table.extend_from_slice(card.as_os_str().as_bytes());
        table.extend_from_slice(b" vfat rw 0 0\n");
        let table_path = tmp.path().join("mounts");
        std::fs::write(&table_path, &table).unwrap();

        let backend = LinuxBackend::from_config(&isolated_config(vec![], vec![media]))
            .with_mount_table(&table_path);
        assert_eq!(backend.storage_dirs().unwrap(), vec![card.clone()]);

        let roots = StorageInventory::new(backend)
            .enumerate_external_storage_roots()
            .unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].path, card);
    }

    #[test]
    fn test_unreadable_mount_table_fails_enumeration() {
        let tmp = TempDir::new().unwrap();
        let backend =
            LinuxBackend::from_config(&isolated_config(vec![], vec![PathBuf::from("/media")]))
                .with_mount_table(tmp.path().join("missing"));

        let err = backend.storage_dirs().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mount_table_not_read_without_prefixes() {
        let backend = LinuxBackend::from_config(&isolated_config(vec![], vec![]))
            .with_mount_table("/definitely/not/here");
        assert!(backend.storage_dirs().unwrap().is_empty());
    }

    #[test]
    fn test_home_directory_follows_extra_roots() {
        let config = Config {
            extra_roots: vec![PathBuf::from("/srv/extra")],
            include_home: true,
            mount_prefixes: Vec::new(),
        };
        let roots = LinuxBackend::from_config(&config).storage_dirs().unwrap();

        let mut expected = vec![PathBuf::from("/srv/extra")];
        expected.extend(dirs::home_dir());
        assert_eq!(roots, expected);
    }

    #[test]
    fn test_access_is_always_granted() {
        assert!(LinuxBackend::default().full_storage_access());
    }
}
