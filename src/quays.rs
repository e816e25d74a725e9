//! Flattens stop places into enriched quay records.

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::fields;
use crate::geo::{CompassDirection, GeoCoordinate, rd_to_wgs84};
use crate::stats::RunStats;
use crate::tree::{as_list, field, number};

/// A single in-use quay with its parent stop and derived location data.
///
/// `geo` is `None` when the quay has no numeric `rd-x`/`rd-y`; `direction` is
/// `None` when it has no numeric bearing. Both serialize as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedQuay {
    pub quay: Map<String, Value>,
    pub stopplace: Map<String, Value>,
    pub geo: Option<GeoCoordinate>,
    pub direction: Option<CompassDirection>,
}

impl EnrichedQuay {
    /// Builds a record from a quay and its owning stop.
    pub fn new(quay: &Map<String, Value>, stop: &Map<String, Value>) -> Self {
        let geo = match (
            number(field(quay, fields::QUAY_RD_X)),
            number(field(quay, fields::QUAY_RD_Y)),
        ) {
            (Some(x), Some(y)) => Some(rd_to_wgs84(x, y)),
            _ => None,
        };
        let direction =
            number(field(quay, fields::QUAY_BEARING)).and_then(CompassDirection::from_bearing);

        let mut stopplace = stop.clone();
        stopplace.shift_remove(fields::STOP_QUAYS);

        Self {
            quay: quay.clone(),
            stopplace,
            geo,
            direction,
        }
    }

    /// Reads a field of the source quay.
    pub fn field(&self, path: &[&str]) -> Option<&Value> {
        field(&self.quay, path)
    }

    pub fn lat(&self) -> Option<f64> {
        self.geo.map(|g| g.lat)
    }

    pub fn lon(&self) -> Option<f64> {
        self.geo.map(|g| g.lon)
    }

    /// Renders the record as a JSON object.
    ///
    /// Quay fields come first in source order, followed by `stopplace`,
    /// `lat`, `lon`, `direction` and `directionfull`. The derived keys
    /// overwrite quay fields of the same name.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.quay.clone();
        map.insert(
            "stopplace".to_string(),
            Value::Object(self.stopplace.clone()),
        );
        map.insert("lat".to_string(), self.lat().into());
        map.insert("lon".to_string(), self.lon().into());
        map.insert(
            "direction".to_string(),
            self.direction.map(|d| d.short).into(),
        );
        map.insert(
            "directionfull".to_string(),
            self.direction.map(|d| d.full).into(),
        );
        map
    }
}

impl Serialize for EnrichedQuay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

/// Expands stop places into one [`EnrichedQuay`] per in-use quay.
///
/// Quays with status `outOfUse` are dropped; every other status passes.
/// Output keeps stop-then-quay source order. Counters are recorded in `stats`.
pub fn flatten_quays(stops: &[&Map<String, Value>], stats: &mut RunStats) -> Vec<EnrichedQuay> {
    let mut records = Vec::new();

    for stop in stops {
        let raw = stop
            .get(fields::STOP_QUAYS)
            .and_then(|quays| quays.get(fields::STOP_QUAY));

        let entries = match raw {
            Some(Value::Array(items)) => items.len(),
            Some(_) => 1,
            None => 0,
        };
        let quays: Vec<_> = as_list(raw)
            .into_iter()
            .filter_map(Value::as_object)
            .collect();
        stats.quays_blank += entries - quays.len();

        for quay in quays {
            stats.quays_seen += 1;

            if field(quay, fields::QUAY_STATUS).and_then(Value::as_str)
                == Some(fields::STATUS_OUT_OF_USE)
            {
                stats.quays_out_of_use += 1;
                continue;
            }

            let record = EnrichedQuay::new(quay, stop);
            if record.geo.is_none() {
                stats.missing_coordinates += 1;
                warn!(quaycode = %quay_code(&record), "Quay has no RD coordinates");
            }
            if record.direction.is_none() {
                stats.missing_bearing += 1;
                warn!(quaycode = %quay_code(&record), "Quay has no bearing");
            }
            records.push(record);
        }
    }

    stats.quays_emitted = records.len();
    debug!(stops = stops.len(), quays = records.len(), "Quays flattened");
    records
}

fn quay_code(record: &EnrichedQuay) -> String {
    match record.field(fields::QUAY_CODE) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<unknown>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quay(code: &str, status: &str, bearing: f64) -> Value {
        json!({
            "quaycode": code,
            "quaystatusdata": { "quaystatus": status },
            "quaylocationdata": { "rd-x": 121000, "rd-y": 487000 },
            "quaybearing": { "compassdirection": bearing },
        })
    }

    fn stop(quays: Value) -> Map<String, Value> {
        json!({
            "stopplacecode": "S1",
            "stopplacename": { "town": "Amsterdam" },
            "quays": { "quay": quays },
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn run(stops: &[Map<String, Value>]) -> (Vec<EnrichedQuay>, RunStats) {
        let refs: Vec<_> = stops.iter().collect();
        let mut stats = RunStats::default();
        let records = flatten_quays(&refs, &mut stats);
        (records, stats)
    }

    fn codes(records: &[EnrichedQuay]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r.field(&["quaycode"]).unwrap().as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_single_quay_object_yields_one_record() {
        let (records, _) = run(&[stop(quay("Q1", "inUse", 0.0))]);
        assert_eq!(codes(&records), vec!["Q1"]);
    }

    #[test]
    fn test_out_of_use_quays_are_dropped() {
        let (records, stats) = run(&[stop(json!([
            quay("Q1", "inUse", 0.0),
            quay("Q2", "outOfUse", 0.0),
            quay("Q3", "unknown", 0.0),
        ]))]);
        assert_eq!(codes(&records), vec!["Q1", "Q3"]);
        assert_eq!(stats.quays_seen, 3);
        assert_eq!(stats.quays_out_of_use, 1);
        assert_eq!(stats.quays_emitted, 2);
    }

    #[test]
    fn test_status_match_is_exact() {
        let (records, _) = run(&[stop(json!([
            quay("Q1", "outofuse", 0.0),
            quay("Q2", "OutOfUse", 0.0),
        ]))]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_count_preserved_across_stops_in_order() {
        let (records, _) = run(&[
            stop(json!([quay("A1", "inUse", 0.0), quay("A2", "outOfUse", 0.0)])),
            stop(quay("B1", "inUse", 0.0)),
            stop(json!([quay("C1", "inUse", 0.0), quay("C2", "inUse", 0.0)])),
        ]);
        assert_eq!(codes(&records), vec!["A1", "B1", "C1", "C2"]);
    }

    #[test]
    fn test_absent_or_empty_quays_contribute_nothing() {
        let mut no_quays = stop(json!(null));
        no_quays.remove("quays");
        let mut empty_quays = stop(json!(null));
        empty_quays.insert("quays".to_string(), json!(""));

        let (records, _) = run(&[no_quays, empty_quays, stop(json!([null, "", {}]))]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_blank_entries_counted() {
        let (records, stats) = run(&[stop(json!([null, quay("Q1", "inUse", 0.0), ""]))]);
        assert_eq!(records.len(), 1);
        assert_eq!(stats.quays_blank, 2);
    }

    #[test]
    fn test_parent_snapshot_excludes_quays() {
        let (records, _) = run(&[stop(quay("Q1", "inUse", 0.0))]);
        let parent = &records[0].stopplace;
        assert_eq!(parent["stopplacecode"], "S1");
        assert_eq!(parent["stopplacename"]["town"], "Amsterdam");
        assert!(!parent.contains_key("quays"));
    }

    #[test]
    fn test_enrichment_derives_geo_and_direction() {
        let (records, _) = run(&[stop(quay("Q1", "inUse", 90.0))]);
        let record = &records[0];
        let geo = record.geo.unwrap();
        assert!((geo.lat - 52.3698).abs() < 0.001);
        assert!((geo.lon - 4.8880).abs() < 0.001);
        assert_eq!(record.direction.unwrap().full, "Oost");
    }

    #[test]
    fn test_missing_fields_get_null_defaults() {
        let bare = json!({ "quaycode": "Q1", "quaystatusdata": { "quaystatus": "inUse" } });
        let (records, stats) = run(&[stop(json!([bare, quay("Q2", "inUse", 180.0)]))]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].geo, None);
        assert_eq!(records[0].direction, None);
        assert!(records[1].geo.is_some());
        assert_eq!(stats.missing_coordinates, 1);
        assert_eq!(stats.missing_bearing, 1);

        let map = records[0].to_map();
        assert_eq!(map["lat"], Value::Null);
        assert_eq!(map["directionfull"], Value::Null);
    }

    #[test]
    fn test_to_map_appends_derived_fields_after_quay_fields() {
        let (records, _) = run(&[stop(quay("Q1", "inUse", 0.0))]);
        let map = records[0].to_map();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "quaycode",
                "quaystatusdata",
                "quaylocationdata",
                "quaybearing",
                "stopplace",
                "lat",
                "lon",
                "direction",
                "directionfull",
            ]
        );
        assert_eq!(map["direction"], "↑");
        assert_eq!(map["directionfull"], "Noord");
    }

    #[test]
    fn test_derived_fields_override_quay_fields() {
        let mut q = quay("Q1", "inUse", 0.0);
        q["direction"] = json!("stale");
        let (records, _) = run(&[stop(q)]);
        assert_eq!(records[0].to_map()["direction"], "↑");
    }
}
