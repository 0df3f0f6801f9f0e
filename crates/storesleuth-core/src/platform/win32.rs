/// Windows storage backend using the Windows API.
///
/// Roots are configured extra roots followed by every local logical drive.
/// Network/remote drives are excluded.
use super::StorageBackend;
use crate::config::Config;
use crate::model::BlockStats;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use windows::core::PCWSTR;
use windows::Wdk::System::SystemServices::RtlGetVersion;
use windows::Win32::Storage::FileSystem::{
    GetDiskFreeSpaceExW, GetDiskFreeSpaceW, GetDriveTypeW, GetLogicalDriveStringsW,
};
use windows::Win32::System::SystemInformation::OSVERSIONINFOW;

// Drive type constants from the Windows API.
const DRIVE_NO_ROOT_DIR_VAL: u32 = 1;
const DRIVE_REMOTE_VAL: u32 = 4;

#[derive(Debug, Clone, Default)]
pub struct WindowsBackend {
    extra_roots: Vec<PathBuf>,
}

impl WindowsBackend {
    pub fn from_config(config: &Config) -> Self {
        Self {
            extra_roots: config.extra_roots.clone(),
        }
    }
}

impl StorageBackend for WindowsBackend {
    fn platform_name(&self) -> &'static str {
        "Windows"
    }

    fn os_version(&self) -> Option<String> {
        // RtlGetVersion is not subject to manifest-based version lying.
        let mut info = OSVERSIONINFOW {
            dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
            ..Default::default()
        };
        let status = unsafe { RtlGetVersion(&mut info) };
        if status.is_err() {
            tracing::warn!("RtlGetVersion failed: {status:?}");
            return None;
        }
        Some(format!(
            "{}.{}.{}",
            info.dwMajorVersion, info.dwMinorVersion, info.dwBuildNumber
        ))
    }

    fn full_storage_access(&self) -> bool {
        true
    }

    fn storage_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let mut dirs = self.extra_roots.clone();
        dirs.extend(logical_drive_roots()?);
        Ok(dirs)
    }

    /// Canonical path in the familiar `C:\` form rather than the verbatim
    /// `\\?\C:\` that `fs::canonicalize` returns.
    fn resolve(&self, dir: &Path) -> io::Result<PathBuf> {
        dunce::canonicalize(dir)
    }

    fn block_stats(&self, path: &Path) -> io::Result<BlockStats> {
        let wide = to_wide(path);
        let root = PCWSTR(wide.as_ptr());

        let mut sectors_per_cluster = 0u32;
        let mut bytes_per_sector = 0u32;
        unsafe {
            GetDiskFreeSpaceW(
                root,
                Some(&mut sectors_per_cluster as *mut u32),
                Some(&mut bytes_per_sector as *mut u32),
                None,
                None,
            )
        }
        .map_err(io::Error::from)?;

        let mut free_caller: u64 = 0;
        let mut total: u64 = 0;
        unsafe {
            GetDiskFreeSpaceExW(
                root,
                Some(&mut free_caller as *mut u64),
                Some(&mut total as *mut u64),
                None,
            )
        }
        .map_err(io::Error::from)?;

        let cluster = u64::from(sectors_per_cluster) * u64::from(bytes_per_sector);
        if cluster == 0 {
            return Err(io::Error::other(format!(
                "{} reports a zero cluster size",
                path.display()
            )));
        }

        Ok(BlockStats {
            block_size: cluster,
            available_blocks: free_caller / cluster,
            total_blocks: total / cluster,
        })
    }
}

/// Every local drive root, e.g. `C:\`, in the order Windows lists them.
fn logical_drive_roots() -> io::Result<Vec<PathBuf>> {
    // First call reports the buffer size needed, in UTF-16 units.
    let needed = unsafe { GetLogicalDriveStringsW(None) };
    if needed == 0 {
        return Err(io::Error::last_os_error());
    }

    let mut buffer = vec![0u16; needed as usize + 1];
    let len = unsafe { GetLogicalDriveStringsW(Some(buffer.as_mut_slice())) };
    if len == 0 {
        return Err(io::Error::last_os_error());
    }
    buffer.truncate((len as usize).min(buffer.len()));

    // Null-separated list of drive roots.
    let mut roots = Vec::new();
    for root in buffer.split(|&c| c == 0).filter(|s| !s.is_empty()) {
        let root = String::from_utf16_lossy(root);
        let root_wide: Vec<u16> = root.encode_utf16().chain(std::iter::once(0)).collect();
        let raw_type = unsafe { GetDriveTypeW(PCWSTR(root_wide.as_ptr())) };

        match raw_type {
            DRIVE_REMOTE_VAL => tracing::debug!("Skipping network drive {root}"),
            DRIVE_NO_ROOT_DIR_VAL => tracing::debug!("Skipping unmounted drive {root}"),
            _ => roots.push(PathBuf::from(root)),
        }
    }

    Ok(roots)
}

fn to_wide(path: &Path) -> Vec<u16> {
    path.as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}
