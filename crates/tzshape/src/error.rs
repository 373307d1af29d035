//! Error types for index construction and lookups.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TzShapeError>;

/// Boxed source error carried by [`TzShapeError::DataAcquisitionFailure`].
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while building or querying a time zone index.
///
/// Construction-time variants (`InvalidBoundingRegion`,
/// `DataAcquisitionFailure`, `MalformedGeometry`) mean no index was produced.
/// `InvalidCoordinate` is a per-query rejection and leaves the index untouched.
#[derive(Error, Debug)]
pub enum TzShapeError {
    /// One or more bounding region constraints were violated. Every violation
    /// found in the call is listed, not only the first.
    #[error("Invalid bounding region: {}", .violations.join("; "))]
    InvalidBoundingRegion { violations: Vec<String> },

    /// The geometry source could not be read, decompressed or decoded.
    #[error("Failed to acquire geometry data from {origin}: {source}")]
    DataAcquisitionFailure {
        origin: String,
        #[source]
        source: BoxedSource,
    },

    /// A decoded record violates the basic shape invariants.
    #[error("Malformed geometry for zone '{zone_id}': {reason}")]
    MalformedGeometry { zone_id: String, reason: String },

    /// A query coordinate lies outside [-90, 90] x [-180, 180].
    #[error("Invalid coordinate ({latitude}, {longitude}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

impl TzShapeError {
    /// Wraps a read or decode failure for `origin`.
    pub fn data_acquisition(origin: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self::DataAcquisitionFailure {
            origin: origin.into(),
            source: source.into(),
        }
    }

    /// Builds a [`TzShapeError::MalformedGeometry`].
    pub fn malformed(zone_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            zone_id: zone_id.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors that abort index construction.
    pub fn is_construction_error(&self) -> bool {
        !matches!(self, Self::InvalidCoordinate { .. })
    }
}
