//! # Engine Configuration
//!
//! Serializable options controlling how the time zone index is built. The
//! defaults index the whole world, clip polygons to the region and prepare
//! geometry on the rayon thread pool.
//!
//! ```rust
//! use tzshape::{BoundingRegion, EngineConfig};
//!
//! let config = EngineConfig {
//!     region: BoundingRegion::new(34.0, -25.0, 72.0, 45.0)?,
//!     ..EngineConfig::default()
//! };
//! assert!(config.index.clip_to_region);
//! # Ok::<(), tzshape::TzShapeError>(())
//! ```

use crate::region::BoundingRegion;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Options for index construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Validate, filter and clip geometry in parallel. The resulting index is
    /// identical either way; only build time changes.
    #[serde(default = "default_true")]
    pub parallel_build: bool,
    /// Clip polygons that straddle the region border down to the region.
    /// When disabled such polygons are kept whole.
    #[serde(default = "default_true")]
    pub clip_to_region: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            parallel_build: true,
            clip_to_region: true,
        }
    }
}

/// Complete configuration for building a [`crate::TimeZoneEngine`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Only geometry intersecting this region is indexed
    #[serde(default)]
    pub region: BoundingRegion,
    /// Index construction options
    #[serde(default)]
    pub index: IndexOptions,
}

impl EngineConfig {
    /// Configuration restricted to `region`, other options at their defaults.
    pub fn with_region(region: BoundingRegion) -> Self {
        Self {
            region,
            ..Self::default()
        }
    }
}
