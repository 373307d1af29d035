//! # Core Type Definitions
//!
//! Fundamental value types shared by the geometry model, the spatial index and
//! the engine facade.
//!
//! ## Key Types
//!
//! - [`Coordinate`] - A latitude/longitude pair in degrees
//! - [`ZoneId`] - Owned, cheaply clonable time zone identifier
//! - [`BoundingBox`] - Axis-aligned rectangle in latitude/longitude space
//!
//! Internally the geometry works in planar `(x, y) = (longitude, latitude)`
//! order, the same order GeoJSON uses for positions. The public types always
//! spell out which axis is which.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Coordinate Limits
// ============================================================================

/// Smallest valid latitude in degrees.
pub const MIN_LATITUDE: f64 = -90.0;
/// Largest valid latitude in degrees.
pub const MAX_LATITUDE: f64 = 90.0;
/// Smallest valid longitude in degrees.
pub const MIN_LONGITUDE: f64 = -180.0;
/// Largest valid longitude in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Returns `true` when `latitude` lies within the inclusive valid range.
///
/// `NaN` is never in range.
pub fn latitude_in_range(latitude: f64) -> bool {
    (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude)
}

/// Returns `true` when `longitude` lies within the inclusive valid range.
pub fn longitude_in_range(longitude: f64) -> bool {
    (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
}

// ============================================================================
// Coordinate
// ============================================================================

/// A geographic coordinate in degrees.
///
/// # Examples
///
/// ```rust
/// use tzshape::Coordinate;
///
/// let berlin = Coordinate::new(52.52, 13.405);
/// assert!(berlin.is_valid());
/// assert!(!Coordinate::new(91.0, 0.0).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, positive north
    pub latitude: f64,
    /// Longitude in degrees, positive east
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate without validating it.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Returns `true` when both components are inside the global valid range.
    pub fn is_valid(&self) -> bool {
        latitude_in_range(self.latitude) && longitude_in_range(self.longitude)
    }

    /// Returns `true` when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Planar `[x, y]` form used by the index (longitude first).
    pub(crate) fn to_point(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// ============================================================================
// Zone Identifier
// ============================================================================

/// Identifier of a time zone region, e.g. `Europe/Berlin`.
///
/// The string is shared behind an [`Arc`], so cloning a `ZoneId` out of the
/// index is cheap while still handing the caller an owned value that cannot
/// reach back into index internals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(Arc<str>);

impl ZoneId {
    /// Creates a zone identifier from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ZoneId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ZoneId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl PartialEq<str> for ZoneId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ZoneId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ZoneId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ZoneId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ZoneId::from)
    }
}

// ============================================================================
// Bounding Box
// ============================================================================

/// Axis-aligned rectangle in latitude/longitude space.
///
/// Used as a fast-reject filter only. Containment is inclusive on every edge
/// so a point on a box border is never pruned away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Creates a box from its corners. No ordering checks are made.
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// The whole valid coordinate space.
    pub const fn world() -> Self {
        Self::new(MIN_LATITUDE, MIN_LONGITUDE, MAX_LATITUDE, MAX_LONGITUDE)
    }

    /// Smallest box enclosing all `points`, or `None` for an empty iterator.
    pub fn from_coordinates<'a>(points: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = Self::new(first.latitude, first.longitude, first.latitude, first.longitude);
        for point in points {
            bbox.extend(point);
        }
        Some(bbox)
    }

    /// Grows the box to include `point`.
    pub fn extend(&mut self, point: &Coordinate) {
        self.min_lat = self.min_lat.min(point.latitude);
        self.max_lat = self.max_lat.max(point.latitude);
        self.min_lon = self.min_lon.min(point.longitude);
        self.max_lon = self.max_lon.max(point.longitude);
    }

    /// Inclusive point containment.
    pub fn contains(&self, point: Coordinate) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lon
            && point.longitude <= self.max_lon
    }

    /// Returns `true` when `other` lies entirely within this box.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.min_lat >= self.min_lat
            && other.max_lat <= self.max_lat
            && other.min_lon >= self.min_lon
            && other.max_lon <= self.max_lon
    }

    /// Returns `true` when the boxes share at least one point, borders included.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
            && self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
    }

    /// Lower-left corner in planar `[x, y]` form.
    pub(crate) fn lower(&self) -> [f64; 2] {
        [self.min_lon, self.min_lat]
    }

    /// Upper-right corner in planar `[x, y]` form.
    pub(crate) fn upper(&self) -> [f64; 2] {
        [self.max_lon, self.max_lat]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[lat {}..{}, lon {}..{}]",
            self.min_lat, self.max_lat, self.min_lon, self.max_lon
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_range_is_inclusive() {
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(90.000001, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_zone_id_equality_and_display() {
        let zone = ZoneId::new("Europe/Berlin");
        assert_eq!(zone, "Europe/Berlin");
        assert_eq!(zone.to_string(), "Europe/Berlin");
        assert_eq!(zone, ZoneId::from(String::from("Europe/Berlin")));

        let json = serde_json::to_string(&zone).unwrap();
        assert_eq!(json, "\"Europe/Berlin\"");
        let back: ZoneId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zone);
    }

    #[test]
    fn test_bounding_box_from_coordinates() {
        let points = [
            Coordinate::new(1.0, 5.0),
            Coordinate::new(-2.0, 7.0),
            Coordinate::new(3.0, 6.0),
        ];
        let bbox = BoundingBox::from_coordinates(&points).unwrap();
        assert_eq!(bbox, BoundingBox::new(-2.0, 5.0, 3.0, 7.0));
        assert!(BoundingBox::from_coordinates(&Vec::<Coordinate>::new()).is_none());
    }

    #[test]
    fn test_bounding_box_predicates() {
        let outer = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let inner = BoundingBox::new(2.0, 2.0, 4.0, 4.0);
        let touching = BoundingBox::new(10.0, 10.0, 12.0, 12.0);
        let apart = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(outer.contains_box(&inner));
        assert!(!inner.contains_box(&outer));
        assert!(outer.intersects(&touching));
        assert!(!outer.intersects(&apart));
        assert!(outer.contains(Coordinate::new(10.0, 0.0)));
        assert!(!outer.contains(Coordinate::new(10.1, 0.0)));
    }
}
