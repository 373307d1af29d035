//! Geometry record sources
//!
//! A source turns bytes into a single-pass sequence of [`GeometryRecord`]s,
//! one per polygon, which the index consumes exactly once. Two encodings are
//! understood, both optionally gzip-compressed:
//!
//! - [`DataFormat::FeatureCollection`]: a GeoJSON `FeatureCollection`, as
//!   published by timezone-boundary-builder
//! - [`DataFormat::FeatureSequence`]: one GeoJSON feature per line, decoded
//!   lazily
//!
//! Compression is detected from the gzip magic bytes, not the file name.

mod bundled;
mod geojson;

pub use bundled::{bundled_records, BUNDLED_ORIGIN};
pub use geojson::{FeatureCollectionRecords, FeatureSequenceRecords};

use crate::error::{Result, TzShapeError};
use crate::types::Coordinate;
use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Polygon geometry exactly as the source delivered it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPolygon {
    /// Outer boundary
    pub exterior: Vec<Coordinate>,
    /// Hole boundaries
    pub holes: Vec<Vec<Coordinate>>,
}

/// One (zone, polygon) pair handed to the index.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    /// Zone identifier, e.g. `Europe/Berlin`
    pub zone_id: String,
    /// Undecoded polygon geometry
    pub polygon: RawPolygon,
}

impl GeometryRecord {
    pub fn new(zone_id: impl Into<String>, polygon: RawPolygon) -> Self {
        Self {
            zone_id: zone_id.into(),
            polygon,
        }
    }
}

/// Encoding of a geometry source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    /// A single GeoJSON `FeatureCollection` document
    #[default]
    FeatureCollection,
    /// Newline-delimited GeoJSON features
    FeatureSequence,
}

impl DataFormat {
    /// Picks a format from a file name. `.gz` suffixes are ignored.
    ///
    /// `.geojsonl`, `.geojsons`, `.ndjson` and `.jsonl` select
    /// [`DataFormat::FeatureSequence`]; everything else is a collection.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let name = name.strip_suffix(".gz").unwrap_or(&name);

        let sequence = [".geojsonl", ".geojsons", ".ndjson", ".jsonl"];
        if sequence.iter().any(|ext| name.ends_with(ext)) {
            Self::FeatureSequence
        } else {
            Self::FeatureCollection
        }
    }
}

/// A lazily decoded sequence of records plus a count hint.
pub struct RecordStream {
    records: Box<dyn Iterator<Item = Result<GeometryRecord>> + Send>,
    expected: usize,
    origin: String,
}

impl RecordStream {
    /// Wraps an arbitrary record iterator.
    pub fn new<I>(records: I, expected: usize, origin: impl Into<String>) -> Self
    where
        I: Iterator<Item = Result<GeometryRecord>> + Send + 'static,
    {
        Self {
            records: Box::new(records),
            expected,
            origin: origin.into(),
        }
    }

    /// Expected number of records, `0` when unknown.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Human-readable description of where the records come from.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl Iterator for RecordStream {
    type Item = Result<GeometryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

/// Opens a dataset file, detecting compression and picking the format from
/// the file name.
pub fn open_path(path: &Path) -> Result<RecordStream> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| TzShapeError::data_acquisition(&origin, e))?;
    debug!("Opened geometry source {}", origin);
    from_reader(file, DataFormat::from_path(path), origin)
}

/// Decodes records from any reader.
///
/// Gzip input is detected from its magic bytes. A collection is parsed up
/// front; a feature sequence is decoded one line at a time as the stream is
/// consumed.
pub fn from_reader<R>(reader: R, format: DataFormat, origin: impl Into<String>) -> Result<RecordStream>
where
    R: Read + Send + 'static,
{
    let origin = origin.into();
    let reader = decompressed(reader, &origin)?;

    match format {
        DataFormat::FeatureCollection => {
            let records = FeatureCollectionRecords::from_reader(reader, &origin)?;
            let expected = records.len();
            Ok(RecordStream::new(records, expected, origin))
        }
        DataFormat::FeatureSequence => {
            let records = FeatureSequenceRecords::new(BufReader::new(reader), origin.clone());
            Ok(RecordStream::new(records, 0, origin))
        }
    }
}

fn decompressed<R>(reader: R, origin: &str) -> Result<Box<dyn Read + Send>>
where
    R: Read + Send + 'static,
{
    let mut buffered = BufReader::new(reader);
    let is_gzip = buffered
        .fill_buf()
        .map_err(|e| TzShapeError::data_acquisition(origin, e))?
        .starts_with(&GZIP_MAGIC);

    if is_gzip {
        debug!("Geometry source {} is gzip-compressed", origin);
        Ok(Box::new(MultiGzDecoder::new(buffered)))
    } else {
        Ok(Box::new(buffered))
    }
}
