/// Size formatting utilities: human-readable byte counts.
///
/// All internal sizes are `u64` bytes. Floating point is only used
/// at the display-formatting boundary.

const UNITS: [(&str, u32); 4] = [("TB", 40), ("GB", 30), ("MB", 20), ("KB", 10)];

/// Format a byte count into a human-readable string with appropriate unit.
///
/// Uses binary units (KiB = 1024) labelled with the short forms users
/// expect from a disk tool. GB and TB get two decimals, KB and MB one.
pub fn format_size(bytes: u64) -> String {
    for (unit, shift) in UNITS {
        let scale = (1u64 << shift) as f64;
        let value = bytes as f64 / scale;
        if value >= 1.0 {
            return if shift >= 30 {
                format!("{value:.2} {unit}")
            } else {
                format!("{value:.1} {unit}")
            };
        }
    }
    format!("{bytes} B")
}

/// Percentage of `total` that is still free, or `None` when `total` is zero.
pub fn free_percent(available: u64, total: u64) -> Option<f64> {
    (total > 0).then(|| available.min(total) as f64 / total as f64 * 100.0)
}
