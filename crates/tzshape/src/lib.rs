//! # tzshape
//!
//! Offline time zone lookup by coordinate. Zone boundary polygons are loaded
//! once into an R*-tree; afterwards any latitude/longitude pair resolves to
//! the identifier of the zone containing it (`Europe/Berlin`,
//! `America/New_York`, ...) or to nothing over open water.
//!
//! ## Core Features
//!
//! - **Build Once, Query Anywhere**: The finished engine is immutable and
//!   `Send + Sync`, so lookups need no locking
//! - **Region Restriction**: Index only a bounding rectangle of the world to
//!   save memory; polygons crossing its border are clipped
//! - **Exact Containment**: Holes are honored and boundary points count as
//!   inside
//! - **Deterministic Overlaps**: Where source polygons overlap, the earliest
//!   record wins
//! - **Flexible Sources**: GeoJSON feature collections or feature sequences,
//!   plain or gzip-compressed, plus a small bundled sample dataset
//!
//! ## Quick Start Example
//!
//! ```rust
//! use tzshape::{BoundingRegion, TimeZoneEngine};
//!
//! let engine = TimeZoneEngine::initialize()?;
//! assert_eq!(engine.query(40.7128, -74.006)?.unwrap(), "America/New_York");
//! assert!(engine.query(0.0, -160.0)?.is_none());
//!
//! // Only Europe
//! let europe = TimeZoneEngine::initialize_with_region(BoundingRegion::new(34.0, -25.0, 72.0, 45.0)?)?;
//! assert!(europe.query(40.7128, -74.006)?.is_none());
//! # Ok::<(), tzshape::TzShapeError>(())
//! ```
//!
//! ## Loading Real Data
//!
//! ```rust,no_run
//! use tzshape::{EngineConfig, TimeZoneEngine};
//!
//! let engine = TimeZoneEngine::from_path("combined.json.gz", &EngineConfig::default())?;
//! println!("{} zones", engine.known_zone_ids().len());
//! # Ok::<(), tzshape::TzShapeError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod index;
pub mod region;
pub mod source;
pub mod types;

pub mod tests;

pub use config::{EngineConfig, IndexOptions};
pub use engine::TimeZoneEngine;
pub use error::{Result, TzShapeError};
pub use geometry::{Polygon, Ring};
pub use index::{IndexStats, SpatialIndex};
pub use region::BoundingRegion;
pub use source::{DataFormat, GeometryRecord, RawPolygon, RecordStream};
pub use types::{BoundingBox, Coordinate, ZoneId};
