/// `statvfs(2)` wrapper shared by every Unix backend.
use crate::model::BlockStats;
use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Query block statistics for the filesystem containing `path`.
///
/// The block size is `f_frsize` (the unit `f_bavail` is counted in),
/// falling back to `f_bsize` on filesystems that leave it zero.
#[allow(clippy::unnecessary_cast)]
pub fn block_stats(path: &Path) -> io::Result<BlockStats> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "path contains an interior NUL byte",
        )
    })?;

    let mut raw = MaybeUninit::<libc::statvfs>::zeroed();
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), raw.as_mut_ptr()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    let raw = unsafe { raw.assume_init() };

    let block_size = if raw.f_frsize != 0 {
        raw.f_frsize as u64
    } else {
        raw.f_bsize as u64
    };

    Ok(BlockStats {
        block_size,
        available_blocks: raw.f_bavail as u64,
        total_blocks: raw.f_blocks as u64,
    })
}
