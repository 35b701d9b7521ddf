use npsmap::storage::{self, SvgOptions};
use npsmap::{Client, Source};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn data() -> npsmap::ParkData {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    Client::default()
        .with_topology(Source::Path(dir.join("states.json")))
        .with_parks(Source::Path(dir.join("parks.csv")))
        .fetch_park_data()
        .unwrap()
}

#[test]
fn save_csv_and_json() {
    let data = data();
    let tmp = tempdir().unwrap();

    let csv_path = tmp.path().join("parks.csv");
    storage::save_parks_csv(&data.parks_data, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("Park Name,State,Latitude,Longitude,Visitors,position_x,position_y"));
    assert_eq!(csv_txt.lines().count(), 1 + data.parks_data.len());

    let json_path = tmp.path().join("data.json");
    storage::save_json(&data, &json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v["parksData"].as_array().unwrap().len(), data.parks_data.len());
    assert_eq!(v["states"].as_array().unwrap().len(), 2);
}

#[test]
fn svg_snapshot_draws_states_mesh_and_projected_parks() {
    let data = data();
    let tmp = tempdir().unwrap();
    let svg_path = tmp.path().join("map.svg");
    let opts = SvgOptions {
        color_column: Some("Visitors".into()),
        ..SvgOptions::default()
    };
    storage::save_svg(&data, &svg_path, &opts).unwrap();
    let svg = fs::read_to_string(&svg_path).unwrap();
    assert!(svg.starts_with("<svg"));
    // two states + one mesh path
    assert_eq!(svg.matches("<path").count(), 3);
    assert!(svg.contains(r#"d="M2,0L2,2""#));
    // American Samoa has no position
    assert_eq!(svg.matches("<circle").count(), 4);
}
