use chb_quays::pipeline::{PipelineConfig, run};
use serde_json::Value;

const SAMPLE: &str = include_str!("fixtures/sample_chb.xml");

#[test]
fn test_full_pipeline() {
    let output = run(SAMPLE, &PipelineConfig::default()).expect("Failed to run pipeline");

    assert_eq!(output.stats.stops_total, 5);
    assert_eq!(output.stops.len(), 4);
    assert_eq!(output.quays.len(), 3);
    assert_eq!(output.projected.len(), 3);
}

#[test]
fn test_every_record_belongs_to_locality() {
    let output = run(SAMPLE, &PipelineConfig::default()).unwrap();

    for stop in &output.stops {
        assert_eq!(stop["stopplacename"]["town"], "Amsterdam");
    }
    for quay in &output.quays {
        assert_eq!(quay.stopplace["stopplacename"]["town"], "Amsterdam");
    }
}

#[test]
fn test_out_of_use_quays_never_projected() {
    let output = run(SAMPLE, &PipelineConfig::default()).unwrap();

    let codes: Vec<_> = output
        .projected
        .iter()
        .map(|p| p.quaycode.as_str().unwrap())
        .collect();
    assert_eq!(
        codes,
        vec!["NL:Q:15311901", "NL:Q:15320001", "NL:Q:15388888"]
    );
    assert!(output.projected.iter().all(|p| p.quaystatus != "outOfUse"));
}

#[test]
fn test_count_matches_quays_minus_out_of_use() {
    let output = run(SAMPLE, &PipelineConfig::default()).unwrap();
    let stats = &output.stats;

    assert_eq!(stats.quays_seen, 4);
    assert_eq!(stats.quays_out_of_use, 1);
    assert_eq!(output.quays.len(), stats.quays_seen - stats.quays_out_of_use);
}

#[test]
fn test_projected_dam_quay() {
    let output = run(SAMPLE, &PipelineConfig::default()).unwrap();
    let dam = serde_json::to_value(&output.projected[0]).unwrap();

    assert_eq!(dam["quaycode"], "NL:Q:15311901");
    assert_eq!(dam["quayname"], "Dam");
    assert_eq!(dam["quaystatus"], "inUse");
    assert_eq!(dam["transportmode"], "BUS");
    assert_eq!(dam["visuallyaccessible"], true);
    assert_eq!(dam["disabledaccessible"], true);
    assert_eq!(dam["compassdirection"], 225);
    assert_eq!(dam["kerbheight"], 18);
    assert_eq!(dam["ramp"], false);
    assert_eq!(dam["direction"], "↙");
    assert_eq!(dam["directionfull"], "Zuidwest");

    let lat = dam["lat"].as_f64().unwrap();
    let lon = dam["lon"].as_f64().unwrap();
    assert!((lat - 52.3698).abs() < 0.001);
    assert!((lon - 4.8880).abs() < 0.001);
}

#[test]
fn test_projected_flags_and_multiple_modes() {
    let output = run(SAMPLE, &PipelineConfig::default()).unwrap();
    let centraal = serde_json::to_value(&output.projected[1]).unwrap();

    assert_eq!(centraal["visuallyaccessible"], false);
    assert_eq!(centraal["disabledaccessible"], false);
    assert_eq!(centraal["transportmode"], serde_json::json!(["TRAM", "BUS"]));
    assert_eq!(centraal["direction"], "↑");
    assert_eq!(centraal["directionfull"], "Noord");
}

#[test]
fn test_quay_without_location_gets_null_defaults() {
    let output = run(SAMPLE, &PipelineConfig::default()).unwrap();
    let bare = serde_json::to_value(&output.projected[2]).unwrap();

    assert_eq!(bare["lat"], Value::Null);
    assert_eq!(bare["lon"], Value::Null);
    assert_eq!(bare["direction"], Value::Null);
    assert_eq!(output.stats.missing_coordinates, 1);
    assert_eq!(output.stats.missing_bearing, 1);
}

#[test]
fn test_enriched_quay_carries_parent_without_quays() {
    let output = run(SAMPLE, &PipelineConfig::default()).unwrap();
    let enriched = serde_json::to_value(&output.quays[0]).unwrap();

    assert_eq!(enriched["quaycode"], "NL:Q:15311901");
    assert_eq!(enriched["stopplace"]["stopplacecode"], "NL:S:15311901");
    assert_eq!(enriched["stopplace"]["stopplacetype"], "onstreetBus");
    assert!(enriched["stopplace"].get("quays").is_none());
    assert_eq!(enriched["directionfull"], "Zuidwest");
}

#[test]
fn test_other_locality() {
    let output = run(SAMPLE, &PipelineConfig::new("Utrecht")).unwrap();

    assert_eq!(output.stops.len(), 1);
    assert_eq!(output.projected.len(), 1);
    assert_eq!(output.projected[0].directionfull, Some("Oost"));
}

#[test]
fn test_output_is_byte_identical_across_runs() {
    let config = PipelineConfig::default();
    let first = run(SAMPLE, &config).unwrap();
    let second = run(SAMPLE, &config).unwrap();

    for (a, b) in [
        (
            serde_json::to_vec_pretty(&first.document).unwrap(),
            serde_json::to_vec_pretty(&second.document).unwrap(),
        ),
        (
            serde_json::to_vec_pretty(&first.stops).unwrap(),
            serde_json::to_vec_pretty(&second.stops).unwrap(),
        ),
        (
            serde_json::to_vec_pretty(&first.quays).unwrap(),
            serde_json::to_vec_pretty(&second.quays).unwrap(),
        ),
        (
            serde_json::to_vec_pretty(&first.projected).unwrap(),
            serde_json::to_vec_pretty(&second.projected).unwrap(),
        ),
    ] {
        assert_eq!(a, b);
    }
}
