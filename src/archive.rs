//! Decoding of downloaded CHB payloads.

use std::io::Read;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns `true` if `bytes` start with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Gunzips `bytes` when they are gzip-compressed and decodes them as UTF-8.
///
/// Plain XML passes through unchanged.
pub fn decode_payload(bytes: &[u8]) -> Result<String> {
    if !is_gzip(bytes) {
        return String::from_utf8(bytes.to_vec()).context("Payload is not valid UTF-8");
    }

    let mut xml = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut xml)
        .context("Failed to gunzip payload")?;
    debug!(compressed = bytes.len(), decompressed = xml.len(), "Payload gunzipped");
    Ok(xml)
}
