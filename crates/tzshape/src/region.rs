//! Build-time bounding region.
//!
//! Records whose geometry lies entirely outside the region are discarded while
//! the index is built. Validation is eager and aggregated: every violated
//! constraint is reported in a single [`TzShapeError::InvalidBoundingRegion`].

use crate::error::{Result, TzShapeError};
use crate::types::{
    latitude_in_range, longitude_in_range, BoundingBox, Coordinate, MAX_LATITUDE, MAX_LONGITUDE,
    MIN_LATITUDE, MIN_LONGITUDE,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated latitude/longitude rectangle restricting what gets indexed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundingBox", into = "BoundingBox")]
pub struct BoundingRegion {
    bounds: BoundingBox,
}

impl BoundingRegion {
    /// Validates the four bounds and builds a region.
    ///
    /// # Errors
    ///
    /// Returns [`TzShapeError::InvalidBoundingRegion`] listing every problem
    /// found: out-of-range latitudes or longitudes and inverted ranges.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tzshape::BoundingRegion;
    ///
    /// let europe = BoundingRegion::new(34.0, -25.0, 72.0, 45.0)?;
    /// assert!(BoundingRegion::new(50.0, 0.0, 10.0, 0.0).is_err());
    /// # Ok::<(), tzshape::TzShapeError>(())
    /// ```
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<Self> {
        let violations = Self::violations(min_lat, min_lon, max_lat, max_lon);
        if !violations.is_empty() {
            return Err(TzShapeError::InvalidBoundingRegion { violations });
        }
        Ok(Self {
            bounds: BoundingBox::new(min_lat, min_lon, max_lat, max_lon),
        })
    }

    /// The whole world, the default when no region is given.
    pub const fn world() -> Self {
        Self {
            bounds: BoundingBox::world(),
        }
    }

    /// Collects every constraint violated by the given bounds.
    pub fn violations(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Vec<String> {
        let mut errors = Vec::new();

        if !latitude_in_range(min_lat) {
            errors.push(format!(
                "minimum latitude {min_lat} is out of range: must be {MIN_LATITUDE} <= latitude <= {MAX_LATITUDE}"
            ));
        }
        if !latitude_in_range(max_lat) {
            errors.push(format!(
                "maximum latitude {max_lat} is out of range: must be {MIN_LATITUDE} <= latitude <= {MAX_LATITUDE}"
            ));
        }
        if !longitude_in_range(min_lon) {
            errors.push(format!(
                "minimum longitude {min_lon} is out of range: must be {MIN_LONGITUDE} <= longitude <= {MAX_LONGITUDE}"
            ));
        }
        if !longitude_in_range(max_lon) {
            errors.push(format!(
                "maximum longitude {max_lon} is out of range: must be {MIN_LONGITUDE} <= longitude <= {MAX_LONGITUDE}"
            ));
        }
        if min_lat > max_lat {
            errors.push(format!(
                "maximum latitude {max_lat} is less than minimum latitude {min_lat}"
            ));
        }
        if min_lon > max_lon {
            errors.push(format!(
                "maximum longitude {max_lon} is less than minimum longitude {min_lon}"
            ));
        }

        errors
    }

    /// The region as a plain bounding box.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Returns `true` when this region covers the whole valid space.
    pub fn is_world(&self) -> bool {
        self.bounds == BoundingBox::world()
    }

    /// Inclusive point containment.
    pub fn contains(&self, point: Coordinate) -> bool {
        self.bounds.contains(point)
    }

    /// Returns `true` when `bbox` shares at least one point with the region.
    pub fn intersects(&self, bbox: &BoundingBox) -> bool {
        self.bounds.intersects(bbox)
    }

    /// Returns `true` when `bbox` lies entirely inside the region.
    pub fn covers(&self, bbox: &BoundingBox) -> bool {
        self.bounds.contains_box(bbox)
    }
}

impl Default for BoundingRegion {
    fn default() -> Self {
        Self::world()
    }
}

impl TryFrom<BoundingBox> for BoundingRegion {
    type Error = TzShapeError;

    fn try_from(b: BoundingBox) -> Result<Self> {
        Self::new(b.min_lat, b.min_lon, b.max_lat, b.max_lon)
    }
}

impl From<BoundingRegion> for BoundingBox {
    fn from(region: BoundingRegion) -> Self {
        region.bounds
    }
}

impl fmt::Display for BoundingRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.bounds.fmt(f)
    }
}
