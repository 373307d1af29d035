/// Polygons with holes
use super::clip::clip_ring;
use super::ring::{Location, Ring, RingError};
use crate::types::{BoundingBox, Coordinate};

/// One outer ring plus zero or more hole rings.
///
/// Holes are assumed to lie within the outer ring. That is not checked;
/// malformed input gives possibly wrong but never panicking answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    /// Builds a polygon from an outer ring and its holes.
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    /// Builds a polygon from raw coordinate rings.
    pub fn from_coordinates(
        exterior: &[Coordinate],
        holes: &[Vec<Coordinate>],
    ) -> Result<Self, PolygonError> {
        let exterior = Ring::new(exterior).map_err(PolygonError::Exterior)?;
        let holes = holes
            .iter()
            .enumerate()
            .map(|(index, hole)| Ring::new(hole).map_err(|e| PolygonError::Hole(index, e)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(exterior, holes))
    }

    /// Bounding box of the outer ring, which encloses the holes as well.
    pub fn bounding_box(&self) -> BoundingBox {
        self.exterior.bounding_box()
    }

    /// The outer ring.
    pub fn exterior(&self) -> &Ring {
        &self.exterior
    }

    /// The hole rings.
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Total number of stored points over all rings.
    pub fn vertex_count(&self) -> usize {
        self.exterior.len() + self.holes.iter().map(Ring::len).sum::<usize>()
    }

    /// Exact containment test.
    ///
    /// A point on any ring edge, hole edges included, belongs to the polygon.
    pub fn contains(&self, point: Coordinate) -> bool {
        match self.exterior.locate(point) {
            Location::Outside => false,
            Location::Boundary => true,
            Location::Inside => self
                .holes
                .iter()
                .all(|hole| hole.locate(point) != Location::Inside),
        }
    }

    /// Clips every ring to `window`.
    ///
    /// Returns `None` when nothing with area survives. Holes that vanish are
    /// dropped. A polygon already inside the window is returned unchanged.
    pub fn clip_to(&self, window: &BoundingBox) -> Option<Polygon> {
        if window.contains_box(&self.bounding_box()) {
            return Some(self.clone());
        }
        if !window.intersects(&self.bounding_box()) {
            return None;
        }

        let exterior = clip_ring(&self.exterior, window)?;
        let holes = self
            .holes
            .iter()
            .filter(|hole| hole.bounding_box().intersects(window))
            .filter_map(|hole| clip_ring(hole, window))
            .collect();
        Some(Self::new(exterior, holes))
    }
}

/// Reason a polygon could not be built.
#[derive(Debug, Clone, PartialEq)]
pub enum PolygonError {
    Exterior(RingError),
    Hole(usize, RingError),
}

impl std::fmt::Display for PolygonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exterior(e) => write!(f, "exterior {e}"),
            Self::Hole(index, e) => write!(f, "hole #{index} {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Vec<Coordinate> {
        vec![
            Coordinate::new(min_lat, min_lon),
            Coordinate::new(min_lat, max_lon),
            Coordinate::new(max_lat, max_lon),
            Coordinate::new(max_lat, min_lon),
            Coordinate::new(min_lat, min_lon),
        ]
    }

    fn donut() -> Polygon {
        Polygon::from_coordinates(&rect(0.0, 0.0, 10.0, 10.0), &[rect(4.0, 4.0, 6.0, 6.0)]).unwrap()
    }

    #[test]
    fn test_hole_excludes_points() {
        let polygon = donut();
        assert!(polygon.contains(Coordinate::new(2.0, 2.0)));
        assert!(!polygon.contains(Coordinate::new(5.0, 5.0)));
        assert!(!polygon.contains(Coordinate::new(11.0, 5.0)));
    }

    #[test]
    fn test_boundaries_belong_to_polygon() {
        let polygon = donut();
        assert!(polygon.contains(Coordinate::new(0.0, 3.0)));
        // Hole edges are part of the polygon as well.
        assert!(polygon.contains(Coordinate::new(4.0, 5.0)));
        assert!(polygon.contains(Coordinate::new(6.0, 6.0)));
    }

    #[test]
    fn test_bounding_box_and_vertex_count() {
        let polygon = donut();
        assert_eq!(polygon.bounding_box(), BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(polygon.vertex_count(), 10);
        assert_eq!(polygon.holes().len(), 1);
    }

    #[test]
    fn test_bad_hole_is_reported_with_index() {
        let bad_hole = vec![Coordinate::new(1.0, 1.0), Coordinate::new(2.0, 2.0)];
        let err = Polygon::from_coordinates(&rect(0.0, 0.0, 10.0, 10.0), &[rect(4.0, 4.0, 6.0, 6.0), bad_hole])
            .unwrap_err();
        assert_eq!(err, PolygonError::Hole(1, RingError::TooFewPoints(3)));
    }

    #[test]
    fn test_clip_keeps_only_window_part() {
        let polygon = donut();
        let window = BoundingBox::new(-5.0, -5.0, 5.0, 20.0);
        let clipped = polygon.clip_to(&window).unwrap();

        assert_eq!(clipped.bounding_box(), BoundingBox::new(0.0, 0.0, 5.0, 10.0));
        assert!(clipped.contains(Coordinate::new(2.0, 2.0)));
        assert!(!clipped.contains(Coordinate::new(4.5, 5.0)));
        assert!(!clipped.contains(Coordinate::new(8.0, 2.0)));
        assert_eq!(clipped.holes().len(), 1);
    }

    #[test]
    fn test_clip_drops_disjoint_and_keeps_contained() {
        let polygon = donut();
        assert!(polygon.clip_to(&BoundingBox::new(20.0, 20.0, 30.0, 30.0)).is_none());
        assert_eq!(polygon.clip_to(&BoundingBox::world()), Some(polygon.clone()));
    }

    #[test]
    fn test_clip_drops_hole_outside_window() {
        let polygon = donut();
        let clipped = polygon.clip_to(&BoundingBox::new(0.0, 0.0, 3.0, 10.0)).unwrap();
        assert!(clipped.holes().is_empty());
        assert!(clipped.contains(Coordinate::new(1.0, 5.0)));
    }
}
