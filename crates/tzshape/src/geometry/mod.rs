//! Geometry model for time zone regions
//!
//! A zone is one or more [`Polygon`]s, each an outer [`Ring`] with optional
//! holes. Polygons cache their bounding box at construction so the index can
//! reject them cheaply; [`Polygon::contains`] is the exact test.
//!
//! Points on an edge count as inside, hole edges included. See
//! [`BOUNDARY_EPSILON`] for the tolerance.

mod clip;
mod polygon;
mod ring;

pub use polygon::{Polygon, PolygonError};
pub use ring::{Location, Ring, RingError, BOUNDARY_EPSILON};
