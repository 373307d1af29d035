/// Entry stored inside the R*-tree
use crate::geometry::Polygon;
use crate::types::{BoundingBox, Coordinate};
use rstar::{Envelope, PointDistance, RTreeObject, AABB};

/// One retained polygon together with its zone and build position.
#[derive(Debug, Clone)]
pub(crate) struct IndexEntry {
    /// Position of the source record; candidates are tested in this order
    pub(crate) sequence: usize,
    /// Index into the interned zone table
    pub(crate) zone: u32,
    /// Source geometry, never the clipped ring
    polygon: Polygon,
    /// Region bounds a clipped polygon is restricted to
    window: Option<BoundingBox>,
    envelope: AABB<[f64; 2]>,
}

impl IndexEntry {
    pub(crate) fn new(sequence: usize, zone: u32, polygon: Polygon) -> Self {
        let extent = polygon.bounding_box();
        Self::with_extent(sequence, zone, polygon, None, extent)
    }

    /// Entry for a polygon cut down to `window`. Only `extent`, the bounds of
    /// the clipped shape, goes into the tree; exact tests still run against the
    /// untouched polygon so clipping artifacts on the window border never
    /// count as area.
    pub(crate) fn clipped(sequence: usize, zone: u32, polygon: Polygon, window: BoundingBox, extent: BoundingBox) -> Self {
        Self::with_extent(sequence, zone, polygon, Some(window), extent)
    }

    fn with_extent(
        sequence: usize,
        zone: u32,
        polygon: Polygon,
        window: Option<BoundingBox>,
        extent: BoundingBox,
    ) -> Self {
        Self {
            sequence,
            zone,
            polygon,
            window,
            envelope: AABB::from_corners(extent.lower(), extent.upper()),
        }
    }

    /// Exact test; boundary points count as inside.
    pub(crate) fn contains(&self, point: Coordinate) -> bool {
        self.window.iter().all(|window| window.contains(point)) && self.polygon.contains(point)
    }
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

// Point lookups only need the cheap box test here; the exact polygon test
// runs afterwards on the surviving candidates.
impl PointDistance for IndexEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        Envelope::distance_2(&self.envelope, point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        Envelope::contains_point(&self.envelope, point)
    }
}
