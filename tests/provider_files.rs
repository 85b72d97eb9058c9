use choromap::provider::{load_snapshot, load_state};
use choromap::{DataState, FeatureIdSource};
use std::fs;
use tempfile::tempdir;

const DISTRICTS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"code": "A"},
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
    {"type": "Feature", "properties": {"code": "B"},
     "geometry": {"type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,0]]]}}
  ]
}"#;

#[test]
fn csv_values_with_property_ids() {
    let dir = tempdir().unwrap();
    let geo = dir.path().join("d.geojson");
    let csv = dir.path().join("v.csv");
    fs::write(&geo, DISTRICTS).unwrap();
    fs::write(&csv, "dx,ou,value,name\nbednets,A,55.5,Alpha\nbednets,B,,Beta\n").unwrap();

    let snap = load_snapshot(&geo, &csv, &FeatureIdSource::Property("code".into())).unwrap();
    assert_eq!(snap.features.len(), 2);
    assert_eq!(snap.features[0].id, "A");
    assert_eq!(snap.values.rows.len(), 1);
    assert_eq!(snap.values.rows[0].value, 55.5);
    let meta = snap.values.metadata.unwrap();
    assert_eq!(meta.name("B"), Some("Beta"));
}

#[test]
fn unreadable_files_fold_into_failed_state() {
    let dir = tempdir().unwrap();
    let geo = dir.path().join("d.geojson");
    fs::write(&geo, DISTRICTS).unwrap();
    let missing = dir.path().join("nope.json");

    let state = load_state(&geo, &missing, &FeatureIdSource::FeatureId);
    assert!(!state.is_ready());
    match state {
        DataState::Failed(msg) => assert!(msg.contains("nope.json")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn features_without_ids_are_skipped() {
    let dir = tempdir().unwrap();
    let geo = dir.path().join("d.geojson");
    let json = dir.path().join("v.json");
    fs::write(&geo, DISTRICTS).unwrap();
    fs::write(&json, r#"{"headers": [], "rows": [], "metaData": {"items": {}}}"#).unwrap();

    let state = load_state(&geo, &json, &FeatureIdSource::FeatureId);
    assert!(state.is_ready());
    match state {
        DataState::Ready(snap) => {
            assert!(snap.features.is_empty());
            assert!(snap.values.metadata.is_some());
        }
        other => panic!("expected ready, got {:?}", other),
    }
}
