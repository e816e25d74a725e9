//! Persistence of pipeline documents.
//!
//! Each run writes four JSON files under a common stem; the stem is either the
//! export's own name (versioned) or [`LATEST_STEM`].

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::pipeline::PipelineOutput;
use crate::stats::RunStats;
use std::fs;
use std::path::{Path, PathBuf};

/// Stem of the files that always hold the most recent export.
pub const LATEST_STEM: &str = "ExportCHBLatest";

/// Logs run statistics as pretty-printed JSON.
pub fn print_stats(stats: &RunStats) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(stats)?);
    info!(
        geocoded_pct = stats.geocoded_pct(),
        retained_pct = stats.retained_pct(),
        "Run coverage"
    );
    Ok(())
}

/// File-name form of a locality: lowercase, spaces become `-`.
pub fn locality_slug(locality: &str) -> String {
    locality
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Writes `bytes` to `<path>.part` and renames it over `path`, so an
/// interrupted write never leaves a truncated file at `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    fs::write(&part, bytes).with_context(|| format!("Failed to write {}", part.display()))?;
    fs::rename(&part, path)
        .with_context(|| format!("Failed to move {} into place", part.display()))?;
    Ok(())
}

/// Writes `value` as pretty-printed JSON, creating parent directories.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let body = serde_json::to_vec_pretty(value)?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes the four documents of a run into `dir`:
///
/// | File                                 | Content                 |
/// |--------------------------------------|-------------------------|
/// | `{stem}.json`                        | full normalized export  |
/// | `{stem}-{slug}.json`                 | stops in the locality   |
/// | `{stem}-{slug}-quays.json`           | enriched quays          |
/// | `{stem}-{slug}-quays-projected.json` | projected quays         |
///
/// Returns the written paths in that order.
pub fn write_documents(
    dir: &Path,
    stem: &str,
    locality: &str,
    output: &PipelineOutput,
) -> Result<Vec<PathBuf>> {
    let slug = locality_slug(locality);
    let paths = vec![
        dir.join(format!("{stem}.json")),
        dir.join(format!("{stem}-{slug}.json")),
        dir.join(format!("{stem}-{slug}-quays.json")),
        dir.join(format!("{stem}-{slug}-quays-projected.json")),
    ];

    write_json(&paths[0], &output.document)?;
    write_json(&paths[1], &output.stops)?;
    write_json(&paths[2], &output.quays)?;
    write_json(&paths[3], &output.projected)?;

    info!(dir = %dir.display(), stem, "Documents written");
    Ok(paths)
}
