use std::io::{Cursor, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::TzShapeError;
use crate::source::DataFormat;
use crate::types::ZoneId;
use crate::TimeZoneEngine;

const WORLD_SAMPLE: &str = include_str!("../../data/world_sample.geojson");

/// The bundled collection rewritten as one feature per line.
fn as_sequence() -> String {
    let collection: Value = serde_json::from_str(WORLD_SAMPLE).unwrap();
    collection["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|feature| serde_json::to_string(feature).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn grid_answers(engine: &TimeZoneEngine) -> Vec<Option<ZoneId>> {
    let mut out = Vec::new();
    for lat in (-60..=70).step_by(3) {
        for lon in (-180..=180).step_by(3) {
            out.push(engine.query(lat as f64 + 0.5, lon as f64 + 0.5).unwrap());
        }
    }
    out
}

#[test]
fn test_gzip_file_matches_bundled_engine() {
    let mut file = tempfile::Builder::new()
        .suffix(".geojson.gz")
        .tempfile()
        .unwrap();
    file.write_all(&gzip(WORLD_SAMPLE.as_bytes())).unwrap();
    file.flush().unwrap();

    let from_file = TimeZoneEngine::from_path(file.path(), &EngineConfig::default()).unwrap();
    let bundled = TimeZoneEngine::initialize().unwrap();

    assert_eq!(from_file.query(52.52, 13.405).unwrap().unwrap(), "Europe/Berlin");
    assert_eq!(from_file.known_zone_ids(), bundled.known_zone_ids());
    assert_eq!(grid_answers(&from_file), grid_answers(&bundled));
}

#[test]
fn test_sequence_and_collection_agree() {
    let config = EngineConfig::default();
    let sequence = TimeZoneEngine::from_reader(
        Cursor::new(as_sequence().into_bytes()),
        DataFormat::FeatureSequence,
        "memory:sequence",
        &config,
    )
    .unwrap();
    let collection = TimeZoneEngine::from_reader(
        Cursor::new(WORLD_SAMPLE.as_bytes().to_vec()),
        DataFormat::FeatureCollection,
        "memory:collection",
        &config,
    )
    .unwrap();

    assert_eq!(sequence.known_zone_ids(), collection.known_zone_ids());
    assert_eq!(sequence.stats().polygons, collection.stats().polygons);
    assert_eq!(grid_answers(&sequence), grid_answers(&collection));
}

#[test]
fn test_sequence_file_picked_by_extension() {
    let mut file = tempfile::Builder::new()
        .suffix(".geojsonl")
        .tempfile()
        .unwrap();
    file.write_all(as_sequence().as_bytes()).unwrap();
    file.flush().unwrap();

    let engine = TimeZoneEngine::from_path(file.path(), &EngineConfig::default()).unwrap();
    assert_eq!(engine.known_zone_ids().len(), 153);
    assert_eq!(engine.query(-33.87, 151.21).unwrap().unwrap(), "Australia/Sydney");
}

#[test]
fn test_missing_file_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let err = TimeZoneEngine::from_path(dir.path().join("absent.geojson"), &EngineConfig::default())
        .unwrap_err();

    assert!(matches!(err, TzShapeError::DataAcquisitionFailure { .. }));
    assert!(err.to_string().contains("absent.geojson"));
}

#[test]
fn test_malformed_feature_aborts_construction() {
    let broken = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"tzid":"Etc/Good"},
         "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
        {"type":"Feature","properties":{"tzid":"Etc/Bad"},
         "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[0,0]]]}}
    ]}"#;

    let err = TimeZoneEngine::from_reader(
        Cursor::new(broken.as_bytes().to_vec()),
        DataFormat::FeatureCollection,
        "memory:broken",
        &EngineConfig::default(),
    )
    .unwrap_err();

    match err {
        TzShapeError::MalformedGeometry { zone_id, .. } => assert_eq!(zone_id, "Etc/Bad"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_corrupt_stream_is_data_acquisition_failure() {
    let mut bytes = gzip(as_sequence().as_bytes());
    bytes.truncate(bytes.len() / 2);

    let err = TimeZoneEngine::from_reader(
        Cursor::new(bytes),
        DataFormat::FeatureSequence,
        "memory:truncated",
        &EngineConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, TzShapeError::DataAcquisitionFailure { .. }));
}
