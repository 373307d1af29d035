/// GeoJSON decoding into geometry records
use super::{GeometryRecord, RawPolygon};
use crate::error::{Result, TzShapeError};
use crate::types::Coordinate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::io::{BufRead, Read};

/// Property keys that may carry the zone identifier, in lookup order.
const ZONE_KEYS: [&str; 3] = ["tzid", "TZID", "zone"];

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

impl Geometry {
    fn polygon_count(&self) -> usize {
        match self.kind.as_str() {
            "MultiPolygon" => self.coordinates.as_array().map_or(0, Vec::len),
            _ => 1,
        }
    }
}

impl Feature {
    /// Splits the feature into one raw polygon per member polygon.
    fn into_records(self, label: &str) -> Result<Vec<GeometryRecord>> {
        let zone_id = self
            .properties
            .as_ref()
            .and_then(|props| ZONE_KEYS.iter().find_map(|key| props.get(*key)))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| TzShapeError::malformed(label, "feature has no tzid property"))?;

        let geometry = self
            .geometry
            .ok_or_else(|| TzShapeError::malformed(&zone_id, "feature has no geometry"))?;

        let polygons = match geometry.kind.as_str() {
            "Polygon" => {
                let rings: Vec<Vec<Vec<f64>>> = decode(&zone_id, geometry.coordinates)?;
                vec![raw_polygon(&zone_id, rings)?]
            }
            "MultiPolygon" => {
                let members: Vec<Vec<Vec<Vec<f64>>>> = decode(&zone_id, geometry.coordinates)?;
                members
                    .into_iter()
                    .map(|rings| raw_polygon(&zone_id, rings))
                    .collect::<Result<Vec<_>>>()?
            }
            other => {
                return Err(TzShapeError::malformed(
                    &zone_id,
                    format!("unsupported geometry type '{other}'"),
                ))
            }
        };

        Ok(polygons
            .into_iter()
            .map(|polygon| GeometryRecord::new(zone_id.clone(), polygon))
            .collect())
    }
}

fn decode<T: serde::de::DeserializeOwned>(zone_id: &str, coordinates: Value) -> Result<T> {
    serde_json::from_value(coordinates)
        .map_err(|e| TzShapeError::malformed(zone_id, format!("invalid coordinates: {e}")))
}

fn raw_polygon(zone_id: &str, rings: Vec<Vec<Vec<f64>>>) -> Result<RawPolygon> {
    let mut rings = rings
        .into_iter()
        .map(|ring| ring.iter().map(|pos| position(zone_id, pos)).collect::<Result<Vec<_>>>());

    let exterior = rings
        .next()
        .ok_or_else(|| TzShapeError::malformed(zone_id, "polygon has no rings"))??;
    let holes = rings.collect::<Result<Vec<_>>>()?;

    Ok(RawPolygon { exterior, holes })
}

/// GeoJSON positions are `[longitude, latitude, ...]`.
fn position(zone_id: &str, pos: &[f64]) -> Result<Coordinate> {
    match pos {
        [lon, lat, ..] => Ok(Coordinate::new(*lat, *lon)),
        _ => Err(TzShapeError::malformed(
            zone_id,
            format!("position has {} values, expected at least 2", pos.len()),
        )),
    }
}

// ============================================================================
// FeatureCollection
// ============================================================================

/// Records from a GeoJSON `FeatureCollection`.
///
/// The document is parsed when the source is opened; features are converted
/// to records one at a time as the iterator advances.
pub struct FeatureCollectionRecords {
    features: std::vec::IntoIter<Feature>,
    pending: VecDeque<GeometryRecord>,
    remaining: usize,
    position: usize,
    failed: bool,
}

impl FeatureCollectionRecords {
    /// Parses a collection document from `reader`.
    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_reader(reader)
            .map_err(|e| TzShapeError::data_acquisition(origin, e))?;

        let remaining = collection
            .features
            .iter()
            .map(|f| f.geometry.as_ref().map_or(1, Geometry::polygon_count))
            .sum();

        Ok(Self {
            features: collection.features.into_iter(),
            pending: VecDeque::new(),
            remaining,
            position: 0,
            failed: false,
        })
    }

    /// Number of records not yet yielded.
    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

impl Iterator for FeatureCollectionRecords {
    type Item = Result<GeometryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(record) = self.pending.pop_front() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(Ok(record));
            }

            let feature = self.features.next()?;
            self.position += 1;
            match feature.into_records(&format!("feature #{}", self.position)) {
                Ok(records) => self.pending.extend(records),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

// ============================================================================
// Feature sequence
// ============================================================================

/// Records from newline-delimited GeoJSON features, decoded lazily.
///
/// Blank lines and RFC 8142 record separators are skipped.
pub struct FeatureSequenceRecords<R> {
    reader: R,
    origin: String,
    line: String,
    line_number: usize,
    pending: VecDeque<GeometryRecord>,
    failed: bool,
}

impl<R: BufRead> FeatureSequenceRecords<R> {
    pub fn new(reader: R, origin: impl Into<String>) -> Self {
        Self {
            reader,
            origin: origin.into(),
            line: String::new(),
            line_number: 0,
            pending: VecDeque::new(),
            failed: false,
        }
    }

    fn fail(&mut self, error: TzShapeError) -> Option<Result<GeometryRecord>> {
        self.failed = true;
        Some(Err(error))
    }
}

impl<R: BufRead> Iterator for FeatureSequenceRecords<R> {
    type Item = Result<GeometryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }

            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => {
                    let err = TzShapeError::data_acquisition(&self.origin, e);
                    return self.fail(err);
                }
            }

            let text = self.line.trim().trim_start_matches('\u{1e}').trim();
            if text.is_empty() {
                continue;
            }

            let feature: Feature = match serde_json::from_str(text) {
                Ok(feature) => feature,
                Err(e) => {
                    let err = TzShapeError::data_acquisition(
                        format!("{} line {}", self.origin, self.line_number),
                        e,
                    );
                    return self.fail(err);
                }
            };

            match feature.into_records(&format!("line {}", self.line_number)) {
                Ok(records) => self.pending.extend(records),
                Err(e) => return self.fail(e),
            }
        }
    }
}
