/// Platform-specific functionality: the `StorageBackend` OS seam and one
/// backend per supported OS family.
///
/// The backend for the build target is exported as [`NativeBackend`]. It is
/// picked at compile time, so call sites never branch on the OS themselves.
use crate::model::BlockStats;
use std::io;
use std::path::{Path, PathBuf};

pub mod permissions;

#[cfg(unix)]
pub mod statvfs;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "linux")]
pub mod mounts;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub mod apple;

#[cfg(windows)]
pub mod win32;

#[cfg(target_os = "linux")]
pub use linux::LinuxBackend as NativeBackend;

#[cfg(target_os = "android")]
pub use android::AndroidBackend as NativeBackend;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use apple::AppleBackend as NativeBackend;

#[cfg(windows)]
pub use win32::WindowsBackend as NativeBackend;

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    windows
)))]
compile_error!("storesleuth-core has no storage backend for this target OS");

/// The OS calls the inventory is built from.
///
/// Every method is a bounded, synchronous query. Implementations must not
/// cache: each call reflects live OS state.
pub trait StorageBackend {
    /// OS family name, e.g. `"Android"`.
    fn platform_name(&self) -> &'static str;

    /// OS release identifier, or `None` when the OS will not say.
    fn os_version(&self) -> Option<String>;

    /// Whether the process may manage all files. Backends for platforms
    /// without such a permission return `true`.
    fn full_storage_access(&self) -> bool;

    /// Root directories the OS exposes to this process, in OS order.
    ///
    /// An `Err` here fails the whole enumeration.
    fn storage_dirs(&self) -> io::Result<Vec<PathBuf>>;

    /// Resolve a directory reported by [`storage_dirs`](Self::storage_dirs)
    /// to its canonical absolute path.
    fn resolve(&self, dir: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(dir)
    }

    /// Block statistics for the filesystem holding `path`.
    fn block_stats(&self, path: &Path) -> io::Result<BlockStats>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    fn platform_name(&self) -> &'static str {
        (**self).platform_name()
    }
    fn os_version(&self) -> Option<String> {
        (**self).os_version()
    }
    fn full_storage_access(&self) -> bool {
        (**self).full_storage_access()
    }
    fn storage_dirs(&self) -> io::Result<Vec<PathBuf>> {
        (**self).storage_dirs()
    }
    fn resolve(&self, dir: &Path) -> io::Result<PathBuf> {
        (**self).resolve(dir)
    }
    fn block_stats(&self, path: &Path) -> io::Result<BlockStats> {
        (**self).block_stats(path)
    }
}
