/// macOS and iOS storage backend.
///
/// Roots are configured extra roots, the home directory (the app sandbox
/// on iOS) and, on macOS, every volume mounted under `/Volumes`.
use super::{statvfs, StorageBackend};
use crate::config::Config;
use crate::model::BlockStats;
use std::io;
use std::path::{Path, PathBuf};
use std::ptr;

const VOLUMES_DIR: &str = "/Volumes";

#[derive(Debug, Clone)]
pub struct AppleBackend {
    extra_roots: Vec<PathBuf>,
    include_home: bool,
}

impl AppleBackend {
    pub fn from_config(config: &Config) -> Self {
        Self {
            extra_roots: config.extra_roots.clone(),
            include_home: config.include_home,
        }
    }
}

impl StorageBackend for AppleBackend {
    fn platform_name(&self) -> &'static str {
        if cfg!(target_os = "ios") {
            "iOS"
        } else {
            "macOS"
        }
    }

    fn os_version(&self) -> Option<String> {
        product_version()
    }

    fn full_storage_access(&self) -> bool {
        true
    }

    fn storage_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let mut roots = self.extra_roots.clone();

        if self.include_home {
            roots.extend(dirs::home_dir());
        }

        match std::fs::read_dir(VOLUMES_DIR) {
            Ok(entries) => {
                for entry in entries {
                    roots.push(entry?.path());
                }
            }
            // iOS has no /Volumes.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        Ok(roots)
    }

    fn block_stats(&self, path: &Path) -> io::Result<BlockStats> {
        statvfs::block_stats(path)
    }
}

/// `kern.osproductversion`, e.g. `14.4.1` or `17.0`.
fn product_version() -> Option<String> {
    let name = c"kern.osproductversion";
    let mut len: libc::size_t = 0;

    let rc = unsafe {
        libc::sysctlbyname(name.as_ptr(), ptr::null_mut(), &mut len, ptr::null_mut(), 0)
    };
    if rc != 0 || len == 0 {
        return None;
    }

    let mut buf = vec![0u8; len];
    let rc = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            buf.as_mut_ptr().cast(),
            &mut len,
            ptr::null_mut(),
            0,
        )
    };
    if rc != 0 {
        tracing::warn!("sysctl kern.osproductversion failed: {}", io::Error::last_os_error());
        return None;
    }

    buf.truncate(len);
    if buf.last() == Some(&0) {
        buf.pop();
    }
    String::from_utf8(buf).ok()
}
