/// Closed boundary rings and the point-location test
use crate::types::{BoundingBox, Coordinate};

/// Tolerance, in degrees, for deciding that a point lies on a ring edge.
///
/// Only the on-edge check uses it. The crossing test itself is exact so real
/// boundary crossings are never masked.
pub const BOUNDARY_EPSILON: f64 = 1e-9;

/// Position of a point relative to a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// Reason a ring was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum RingError {
    TooFewPoints(usize),
    TooFewDistinctPoints(usize),
    NonFinite(Coordinate),
}

impl std::fmt::Display for RingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewPoints(n) => {
                write!(f, "ring has {n} points after closing, at least 4 are required")
            }
            Self::TooFewDistinctPoints(n) => {
                write!(f, "ring has only {n} distinct points, at least 3 are required")
            }
            Self::NonFinite(c) => write!(f, "ring contains non-finite coordinate {c}"),
        }
    }
}

/// A closed, simple boundary loop stored as planar `[lon, lat]` points.
///
/// The first point is always repeated as the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<[f64; 2]>,
    bbox: BoundingBox,
}

impl Ring {
    /// Builds a ring, closing it implicitly when the input is open.
    pub fn new(coordinates: &[Coordinate]) -> Result<Self, RingError> {
        if let Some(bad) = coordinates.iter().find(|c| !c.is_finite()) {
            return Err(RingError::NonFinite(*bad));
        }

        let mut points: Vec<[f64; 2]> = coordinates.iter().map(|c| c.to_point()).collect();
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
            if first != last {
                points.push(first);
            }
        }
        Self::from_closed_points(points)
    }

    /// Validates already-closed planar points.
    pub(crate) fn from_closed_points(points: Vec<[f64; 2]>) -> Result<Self, RingError> {
        if points.len() < 4 {
            return Err(RingError::TooFewPoints(points.len()));
        }

        let distinct = distinct_count(&points[..points.len() - 1]);
        if distinct < 3 {
            return Err(RingError::TooFewDistinctPoints(distinct));
        }

        let bbox = planar_bbox(&points);
        Ok(Self { points, bbox })
    }

    /// Cached bounding box of every vertex.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Number of stored points, closing point included.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A ring is never empty once constructed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Planar points, closing point included.
    pub(crate) fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Vertices as coordinates, closing point included.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.points.iter().map(|p| Coordinate::new(p[1], p[0]))
    }

    /// Locates `point` relative to this ring using the even-odd rule.
    ///
    /// Points within [`BOUNDARY_EPSILON`] of an edge report
    /// [`Location::Boundary`].
    pub fn locate(&self, point: Coordinate) -> Location {
        if !self.bbox.contains(point) {
            // Still allow the epsilon band just outside the box.
            let grown = BoundingBox::new(
                self.bbox.min_lat - BOUNDARY_EPSILON,
                self.bbox.min_lon - BOUNDARY_EPSILON,
                self.bbox.max_lat + BOUNDARY_EPSILON,
                self.bbox.max_lon + BOUNDARY_EPSILON,
            );
            if !grown.contains(point) {
                return Location::Outside;
            }
        }

        let [px, py] = point.to_point();
        let mut inside = false;

        for edge in self.points.windows(2) {
            let [ax, ay] = edge[0];
            let [bx, by] = edge[1];

            if on_segment(px, py, ax, ay, bx, by) {
                return Location::Boundary;
            }

            if (ay > py) != (by > py) {
                let x_cross = ax + (py - ay) * (bx - ax) / (by - ay);
                if px < x_cross {
                    inside = !inside;
                }
            }
        }

        if inside {
            Location::Inside
        } else {
            Location::Outside
        }
    }
}

fn on_segment(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> bool {
    if px < ax.min(bx) - BOUNDARY_EPSILON
        || px > ax.max(bx) + BOUNDARY_EPSILON
        || py < ay.min(by) - BOUNDARY_EPSILON
        || py > ay.max(by) + BOUNDARY_EPSILON
    {
        return false;
    }

    let dx = bx - ax;
    let dy = by - ay;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return (px - ax).abs() <= BOUNDARY_EPSILON && (py - ay).abs() <= BOUNDARY_EPSILON;
    }

    // Perpendicular distance from the point to the segment's line.
    let cross = dx * (py - ay) - dy * (px - ax);
    cross.abs() / length <= BOUNDARY_EPSILON
}

fn distinct_count(points: &[[f64; 2]]) -> usize {
    let mut seen: Vec<[f64; 2]> = Vec::with_capacity(3);
    for point in points {
        if !seen.contains(point) {
            seen.push(*point);
            if seen.len() >= 3 {
                break;
            }
        }
    }
    seen.len()
}

pub(crate) fn planar_bbox(points: &[[f64; 2]]) -> BoundingBox {
    let mut bbox = BoundingBox::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &[x, y] in points {
        bbox.min_lon = bbox.min_lon.min(x);
        bbox.max_lon = bbox.max_lon.max(x);
        bbox.min_lat = bbox.min_lat.min(y);
        bbox.max_lat = bbox.max_lat.max(y);
    }
    bbox
}
