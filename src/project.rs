//! Reduced, renamed view of enriched quays for downstream consumers.

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::fields;
use crate::quays::EnrichedQuay;
use crate::tree::as_list;

/// Flag value meaning "accessible".
const FLAG_YES: &str = "Y";

/// The projected fields of one quay.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedQuay {
    pub quaycode: Value,
    pub quayname: Value,
    pub quaystatus: Value,
    pub transportmode: Value,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub visuallyaccessible: bool,
    pub disabledaccessible: bool,
    /// Raw bearing as published, not the derived label.
    pub compassdirection: Value,
    pub adaptations: Map<String, Value>,
    pub direction: Option<&'static str>,
    pub directionfull: Option<&'static str>,
}

impl ProjectedQuay {
    pub fn from_enriched(quay: &EnrichedQuay) -> Self {
        let raw = |path: &[&str]| quay.field(path).cloned().unwrap_or(Value::Null);

        let adaptations = match quay.field(fields::QUAY_ADAPTATIONS) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        ProjectedQuay {
            quaycode: raw(fields::QUAY_CODE),
            quayname: raw(fields::QUAY_NAME),
            quaystatus: raw(fields::QUAY_STATUS),
            transportmode: transport_mode(quay),
            lat: quay.lat(),
            lon: quay.lon(),
            visuallyaccessible: is_yes(quay.field(fields::QUAY_VISUALLY_ACCESSIBLE)),
            disabledaccessible: is_yes(quay.field(fields::QUAY_DISABLED_ACCESSIBLE)),
            compassdirection: raw(fields::QUAY_BEARING),
            adaptations,
            direction: quay.direction.map(|d| d.short),
            directionfull: quay.direction.map(|d| d.full),
        }
    }

    /// Renders the record as a JSON object.
    ///
    /// Keys are written in a fixed order: the nine fixed fields, then every
    /// adaptation key, then `direction` and `directionfull`. A later write to
    /// an existing key replaces its value in place, so adaptation keys shadow
    /// same-named fixed fields and the two direction labels always win.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("quaycode".to_string(), self.quaycode.clone());
        map.insert("quayname".to_string(), self.quayname.clone());
        map.insert("quaystatus".to_string(), self.quaystatus.clone());
        map.insert("transportmode".to_string(), self.transportmode.clone());
        map.insert("lat".to_string(), self.lat.into());
        map.insert("lon".to_string(), self.lon.into());
        map.insert(
            "visuallyaccessible".to_string(),
            self.visuallyaccessible.into(),
        );
        map.insert(
            "disabledaccessible".to_string(),
            self.disabledaccessible.into(),
        );
        map.insert(
            "compassdirection".to_string(),
            self.compassdirection.clone(),
        );

        for (key, value) in &self.adaptations {
            map.insert(key.clone(), value.clone());
        }

        map.insert("direction".to_string(), self.direction.into());
        map.insert("directionfull".to_string(), self.directionfull.into());
        map
    }
}

impl Serialize for ProjectedQuay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

/// A quay lists one `transportmodedata` per mode; one mode projects as a
/// scalar, several as an array.
fn transport_mode(quay: &EnrichedQuay) -> Value {
    let mut modes: Vec<Value> = as_list(quay.field(fields::QUAY_TRANSPORT_MODES))
        .into_iter()
        .filter_map(|data| data.get(fields::TRANSPORT_MODE))
        .cloned()
        .collect();

    match modes.len() {
        0 => Value::Null,
        1 => modes.remove(0),
        _ => Value::Array(modes),
    }
}

fn is_yes(flag: Option<&Value>) -> bool {
    matches!(flag, Some(Value::String(s)) if s == FLAG_YES)
}

/// Projects every enriched quay, keeping order.
pub fn project_quays(quays: &[EnrichedQuay]) -> Vec<ProjectedQuay> {
    let projected: Vec<_> = quays.iter().map(ProjectedQuay::from_enriched).collect();
    debug!(records = projected.len(), "Quays projected");
    projected
}
