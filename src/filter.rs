//! Locality filter over the normalized stop list.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::fields;
use crate::tree::{as_list, field};

/// Locality used when none is configured.
pub const DEFAULT_LOCALITY: &str = "Amsterdam";

/// Returns every stop place in the document, in source order.
///
/// # Errors
///
/// Returns [`PipelineError::SchemaShape`] if `export` or `export.stopplaces`
/// is missing. An empty `stopplaces` element yields no stops.
pub fn stop_places(doc: &Value) -> Result<Vec<&Map<String, Value>>> {
    let export = doc
        .get(fields::EXPORT)
        .ok_or_else(|| PipelineError::SchemaShape(fields::EXPORT.to_string()))?;
    let stopplaces = export.get(fields::STOPPLACES).ok_or_else(|| {
        PipelineError::SchemaShape(format!("{}.{}", fields::EXPORT, fields::STOPPLACES))
    })?;

    Ok(as_list(stopplaces.get(fields::STOPPLACE))
        .into_iter()
        .filter_map(Value::as_object)
        .collect())
}

/// Selects the stop places whose `stopplacename.town` equals `locality`.
///
/// The match is exact and case-sensitive; stops without a town are skipped.
pub fn stops_in_locality<'a>(
    doc: &'a Value,
    locality: &str,
) -> Result<Vec<&'a Map<String, Value>>> {
    let all = stop_places(doc)?;
    let total = all.len();

    let retained: Vec<_> = all
        .into_iter()
        .filter(|stop| in_locality(stop, locality))
        .collect();

    debug!(total, retained = retained.len(), locality, "Stops filtered");
    Ok(retained)
}

fn in_locality(stop: &Map<String, Value>, locality: &str) -> bool {
    field(stop, fields::STOP_TOWN).and_then(Value::as_str) == Some(locality)
}
