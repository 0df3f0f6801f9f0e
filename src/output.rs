//! Rendering of query results for the terminal.

use crate::Format;
use serde::Serialize;
use std::io::Write;
use storesleuth_core::model::size::{format_size, free_percent};
use storesleuth_core::{PlatformInfo, RootUsage, StorageRoot};

pub fn platform(out: &mut impl Write, info: &PlatformInfo) -> anyhow::Result<()> {
    writeln!(out, "{info}")?;
    Ok(())
}

pub fn access(out: &mut impl Write, granted: bool) -> anyhow::Result<()> {
    writeln!(out, "{}", if granted { "granted" } else { "denied" })?;
    Ok(())
}

pub fn json(out: &mut impl Write, value: &impl Serialize) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Roots in the chosen format. JSON and CSV carry the plain root records;
/// the table adds capacity columns.
pub fn roots(out: &mut impl Write, usage: &[RootUsage], format: Format) -> anyhow::Result<()> {
    let records = || usage.iter().map(|u| &u.root);
    match format {
        Format::Table => table(out, usage),
        Format::Json => json(out, &records().collect::<Vec<&StorageRoot>>()),
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            for root in records() {
                writer.serialize(root)?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}

fn table(out: &mut impl Write, usage: &[RootUsage]) -> anyhow::Result<()> {
    if usage.is_empty() {
        writeln!(out, "No storage roots found.")?;
        return Ok(());
    }

    let width = usage
        .iter()
        .map(|u| u.root.path.to_string_lossy().chars().count())
        .max()
        .unwrap_or(0)
        .max("PATH".len());

    writeln!(
        out,
        "{:<width$}  {:>12}  {:>12}  {:>6}",
        "PATH", "FREE", "TOTAL", "FREE%"
    )?;
    for u in usage {
        let percent = free_percent(u.root.available_bytes, u.total_bytes)
            .map_or_else(|| "-".to_string(), |p| format!("{p:.1}%"));
        writeln!(
            out,
            "{:<width$}  {:>12}  {:>12}  {:>6}",
            u.root.path.display().to_string(),
            format_size(u.root.available_bytes),
            format_size(u.total_bytes),
            percent
        )?;
    }
    Ok(())
}
