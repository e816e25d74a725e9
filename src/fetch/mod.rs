//! Retrieval of CHB exports from the NDOV index.
//!
//! The index is a plain directory listing; exports are named
//! `ExportCHB<YYYYMMDDHHMMSS>.xml.gz`.

mod client;
mod basic;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use regex::Regex;
use reqwest::Url;
use tracing::debug;

/// Directory listing that publishes the CHB exports.
pub const DEFAULT_INDEX_URL: &str = "https://data.ndovloket.nl/haltes/";

const EXPORT_PREFIX: &str = "ExportCHB";
const EXPORT_SUFFIX: &str = ".xml.gz";

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let resp = client.get(url).await?;
    Ok(resp.bytes().await?.to_vec())
}

/// Lists the export archives linked from the index page at `index_url`.
#[tracing::instrument(skip(client))]
pub async fn list_exports<C: HttpClient>(client: &C, index_url: &str) -> Result<Vec<String>> {
    let bytes = fetch_bytes(client, index_url)
        .await
        .with_context(|| format!("Failed to fetch index '{index_url}'"))?;
    let html = String::from_utf8_lossy(&bytes);

    let names = parse_export_links(&html)?;
    debug!(count = names.len(), "Exports listed");
    Ok(names)
}

/// Extracts distinct `ExportCHB*.xml.gz` file names from an HTML listing, in
/// page order.
pub fn parse_export_links(html: &str) -> Result<Vec<String>> {
    let re = Regex::new(r#"href="(?:[^"]*/)?(ExportCHB[^"/]*\.xml\.gz)""#)?;

    let mut names: Vec<String> = Vec::new();
    for cap in re.captures_iter(html) {
        let name = cap[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

/// Parses the timestamp embedded in an export name, if there is one.
pub fn export_timestamp(name: &str) -> Option<NaiveDateTime> {
    let stamp = name
        .strip_prefix(EXPORT_PREFIX)?
        .strip_suffix(EXPORT_SUFFIX)?;
    NaiveDateTime::parse_from_str(stamp.get(..14)?, "%Y%m%d%H%M%S").ok()
}

/// Picks the newest export.
///
/// Stamped names win over unstamped ones; ties and unstamped names fall back
/// to lexicographic order.
pub fn latest_export(names: &[String]) -> Option<&String> {
    names
        .iter()
        .max_by_key(|&name| (export_timestamp(name), name.as_str()))
}

/// Resolves an export name against the index URL.
pub fn export_url(index_url: &str, name: &str) -> Result<String> {
    let base = Url::parse(index_url).with_context(|| format!("Invalid index URL '{index_url}'"))?;
    Ok(base.join(name)?.to_string())
}

/// Strips the archive suffix: `ExportCHB20240101.xml.gz` → `ExportCHB20240101`.
pub fn export_stem(name: &str) -> &str {
    name.strip_suffix(EXPORT_SUFFIX)
        .or_else(|| name.strip_suffix(".xml"))
        .unwrap_or(name)
}
