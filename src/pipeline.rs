//! End-to-end transformation: XML text in, derived documents out.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::filter::{self, DEFAULT_LOCALITY};
use crate::parser::parse_document;
use crate::project::{ProjectedQuay, project_quays};
use crate::quays::{EnrichedQuay, flatten_quays};
use crate::stats::RunStats;

/// Options recognized by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Town a stop must be in, matched exactly.
    pub locality: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            locality: DEFAULT_LOCALITY.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new(locality: impl Into<String>) -> Self {
        Self {
            locality: locality.into(),
        }
    }
}

/// Every document produced by one run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// The whole normalized export.
    pub document: Value,
    /// Stop places in the locality, with all their properties.
    pub stops: Vec<Value>,
    /// One record per in-use quay of those stops.
    pub quays: Vec<EnrichedQuay>,
    /// Reduced view of `quays`.
    pub projected: Vec<ProjectedQuay>,
    pub stats: RunStats,
}

/// Runs all stages over `xml`.
///
/// # Errors
///
/// Fails on malformed XML or when the export lacks `export.stopplaces`; no
/// partial output is returned.
pub fn run(xml: &str, config: &PipelineConfig) -> Result<PipelineOutput> {
    let document = parse_document(xml)?;
    let mut stats = RunStats::new(&config.locality);

    stats.stops_total = filter::stop_places(&document)?.len();
    let stops = filter::stops_in_locality(&document, &config.locality)?;
    stats.stops_retained = stops.len();

    let quays = flatten_quays(&stops, &mut stats);
    let projected = project_quays(&quays);

    let stops = stops.into_iter().cloned().map(Value::Object).collect();

    info!(
        locality = %config.locality,
        stops_total = stats.stops_total,
        stops_retained = stats.stops_retained,
        quays = stats.quays_emitted,
        out_of_use = stats.quays_out_of_use,
        "Pipeline run complete"
    );

    Ok(PipelineOutput {
        document,
        stops,
        quays,
        projected,
        stats,
    })
}
