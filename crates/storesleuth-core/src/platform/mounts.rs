/// Mount table parsing (`/proc/self/mounts` format).
///
/// The table is handled as raw bytes: the kernel writes mount points
/// verbatim apart from four escaped characters, so they need not be UTF-8.
use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;
use std::path::{Path, PathBuf};

/// Path of the per-process mount table.
pub const MOUNT_TABLE: &str = "/proc/self/mounts";

/// Mount points from `table`, in table order, restricted to those that sit
/// at or below one of `prefixes`.
///
/// Lines with fewer than two fields are ignored.
pub fn mount_points_under(table: &[u8], prefixes: &[PathBuf]) -> Vec<PathBuf> {
    table
        .split(|&b| b == b'\n')
        .filter_map(|line| {
            line.split(|b| b.is_ascii_whitespace())
                .filter(|field| !field.is_empty())
                .nth(1)
        })
        .map(|field| PathBuf::from(OsString::from_vec(unescape(field))))
        .filter(|mount| is_under_any(mount, prefixes))
        .collect()
}

fn is_under_any(mount: &Path, prefixes: &[PathBuf]) -> bool {
    prefixes.iter().any(|prefix| mount.starts_with(prefix))
}

/// Decode the kernel's `\ooo` octal escapes (space, tab, newline, backslash).
fn unescape(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_triplet(&bytes[i + 1..i + 4]) {
            let value = bytes[i + 1..i + 4]
                .iter()
                .fold(0u32, |acc, &b| acc * 8 + u32::from(b - b'0'));
            out.push(value as u8);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

fn is_octal_triplet(digits: &[u8]) -> bool {
    digits.len() == 3 && digits.iter().all(|b| (b'0'..=b'7').contains(b))
}
