//! # Time Zone Engine
//!
//! The public entry point. An engine is built once, blocking, from a geometry
//! source and a region, and afterwards answers point lookups from any number
//! of threads. Share it behind an [`std::sync::Arc`] or a `&'static`.
//!
//! ```rust
//! use tzshape::TimeZoneEngine;
//!
//! let engine = TimeZoneEngine::initialize()?;
//! let zone = engine.query(52.52, 13.405)?;
//! assert_eq!(zone.unwrap(), "Europe/Berlin");
//! # Ok::<(), tzshape::TzShapeError>(())
//! ```

use crate::config::EngineConfig;
use crate::error::Result;
use crate::index::{IndexStats, SpatialIndex};
use crate::region::BoundingRegion;
use crate::source::{self, DataFormat, GeometryRecord, RecordStream};
use crate::types::{Coordinate, ZoneId};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Immutable, thread-safe time zone lookup.
#[derive(Debug)]
pub struct TimeZoneEngine {
    index: SpatialIndex,
}

impl TimeZoneEngine {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Builds an engine over the whole world from the bundled dataset.
    pub fn initialize() -> Result<Self> {
        Self::initialize_with_region(BoundingRegion::world())
    }

    /// Builds an engine from the bundled dataset, keeping only geometry that
    /// intersects `region`.
    pub fn initialize_with_region(region: BoundingRegion) -> Result<Self> {
        Self::from_bundled(&EngineConfig::with_region(region))
    }

    /// Builds an engine from the bundled dataset with full control over the
    /// index options.
    pub fn from_bundled(config: &EngineConfig) -> Result<Self> {
        Self::from_stream(source::bundled_records()?, config)
    }

    /// Builds an engine from the bundled dataset for the given bounds.
    ///
    /// All bounds are validated before any data is read. When several are
    /// wrong, the returned [`crate::TzShapeError::InvalidBoundingRegion`]
    /// lists every problem.
    ///
    /// # Arguments
    ///
    /// * `min_lat` - Southern edge, `-90..=90`
    /// * `min_lon` - Western edge, `-180..=180`
    /// * `max_lat` - Northern edge, not below `min_lat`
    /// * `max_lon` - Eastern edge, not below `min_lon`
    pub fn initialize_bounded(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<Self> {
        let region = BoundingRegion::new(min_lat, min_lon, max_lat, max_lon)?;
        Self::initialize_with_region(region)
    }

    /// Builds an engine from a dataset file, plain or gzip-compressed.
    ///
    /// Files named `*.geojsonl`, `*.geojsons`, `*.ndjson` or `*.jsonl`
    /// (optionally followed by `.gz`) are read as feature sequences, anything
    /// else as a single feature collection.
    pub fn from_path(path: impl AsRef<Path>, config: &EngineConfig) -> Result<Self> {
        Self::from_stream(source::open_path(path.as_ref())?, config)
    }

    /// Builds an engine from an arbitrary reader.
    pub fn from_reader<R>(reader: R, format: DataFormat, origin: &str, config: &EngineConfig) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        Self::from_stream(source::from_reader(reader, format, origin)?, config)
    }

    /// Builds an engine from already decoded records.
    ///
    /// `expected` is only a capacity hint.
    pub fn from_records<I>(records: I, expected: usize, config: &EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Result<GeometryRecord>>,
    {
        let index = SpatialIndex::build(records, expected, config.region, &config.index)?;
        Ok(Self { index })
    }

    fn from_stream(stream: RecordStream, config: &EngineConfig) -> Result<Self> {
        info!("Loading time zone geometry from {}", stream.origin());
        let expected = stream.expected();
        Self::from_records(stream, expected, config)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Zone containing the point, or `None` over open water and outside the
    /// build region.
    ///
    /// # Errors
    ///
    /// [`crate::TzShapeError::InvalidCoordinate`] when latitude is outside
    /// `-90..=90`, longitude outside `-180..=180`, or either is NaN.
    pub fn query(&self, latitude: f64, longitude: f64) -> Result<Option<ZoneId>> {
        self.index.query(latitude, longitude)
    }

    pub fn query_coordinate(&self, coordinate: Coordinate) -> Result<Option<ZoneId>> {
        self.index.query_coordinate(coordinate)
    }

    /// Batch lookup, evaluated in parallel. Results keep the input order.
    pub fn query_many(&self, coordinates: &[Coordinate]) -> Vec<Result<Option<ZoneId>>> {
        self.index.query_many(coordinates)
    }

    /// All zones whose polygons contain the point, earliest source record first.
    pub fn candidates(&self, latitude: f64, longitude: f64) -> Result<Vec<ZoneId>> {
        self.index.candidates(latitude, longitude)
    }

    /// Distinct zones present in the engine, in source order.
    pub fn known_zone_ids(&self) -> Vec<ZoneId> {
        self.index.known_zone_ids()
    }

    pub fn stats(&self) -> &IndexStats {
        self.index.stats()
    }

    pub fn region(&self) -> &BoundingRegion {
        self.index.region()
    }
}
