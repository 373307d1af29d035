//! # Spatial Index
//!
//! Immutable R*-tree over time zone polygons. Every node of the tree stores
//! the envelope of everything beneath it, so a point lookup descends only
//! into subtrees whose envelope contains the point. The few polygons that
//! survive the envelope test are checked exactly, in source order, and the
//! first one containing the point decides the answer.
//!
//! The index is built once and never mutated afterwards. All query methods
//! take `&self` and can run from any number of threads at the same time.

mod builder;
mod entry;
mod stats;

pub use stats::IndexStats;

use crate::config::IndexOptions;
use crate::error::{Result, TzShapeError};
use crate::region::BoundingRegion;
use crate::source::GeometryRecord;
use crate::types::{Coordinate, ZoneId};
use entry::IndexEntry;
use rayon::prelude::*;
use rstar::RTree;
use smallvec::SmallVec;
use tracing::trace;

/// Candidate lists rarely exceed a handful of polygons.
type Candidates<'a> = SmallVec<[&'a IndexEntry; 4]>;

/// Time zone polygons organized for point lookups.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
    /// Interned zone identifiers in first-appearance order
    zones: Vec<ZoneId>,
    region: BoundingRegion,
    stats: IndexStats,
}

impl SpatialIndex {
    /// Builds an index from a sequence of geometry records.
    ///
    /// # Arguments
    ///
    /// * `records` - Source records; the first `Err` aborts the build
    /// * `expected` - Expected record count, `0` when unknown
    /// * `region` - Only geometry intersecting this region is kept
    /// * `options` - Clipping and parallelism switches
    ///
    /// # Returns
    ///
    /// The finished index, or the first data or geometry error encountered.
    pub fn build<I>(records: I, expected: usize, region: BoundingRegion, options: &IndexOptions) -> Result<Self>
    where
        I: IntoIterator<Item = Result<GeometryRecord>>,
    {
        builder::build(records, expected, region, options)
    }

    /// Looks up the zone containing a point.
    ///
    /// Returns `Ok(None)` when no indexed polygon contains the point, which is
    /// the normal answer for open ocean or anything outside the build region.
    /// Points on a polygon's boundary belong to that polygon.
    pub fn query(&self, latitude: f64, longitude: f64) -> Result<Option<ZoneId>> {
        let point = checked(latitude, longitude)?;
        let hit = self
            .sorted_candidates(point)
            .into_iter()
            .find(|entry| entry.contains(point))
            .map(|entry| self.zone(entry));

        trace!("Lookup {} -> {:?}", point, hit);
        Ok(hit)
    }

    /// Same as [`SpatialIndex::query`] for a [`Coordinate`].
    pub fn query_coordinate(&self, coordinate: Coordinate) -> Result<Option<ZoneId>> {
        self.query(coordinate.latitude, coordinate.longitude)
    }

    /// Answers many lookups at once on the rayon pool.
    ///
    /// Results come back in input order. Invalid coordinates produce an `Err`
    /// in their own slot without affecting the others.
    pub fn query_many(&self, coordinates: &[Coordinate]) -> Vec<Result<Option<ZoneId>>> {
        coordinates
            .par_iter()
            .map(|coordinate| self.query_coordinate(*coordinate))
            .collect()
    }

    /// Every zone containing the point, in source order and without repeats.
    ///
    /// Normally this has at most one element. Several entries show up where
    /// source polygons overlap, and the first of them is what
    /// [`SpatialIndex::query`] returns.
    pub fn candidates(&self, latitude: f64, longitude: f64) -> Result<Vec<ZoneId>> {
        let point = checked(latitude, longitude)?;
        let mut zones: Vec<ZoneId> = Vec::new();
        for entry in self.sorted_candidates(point) {
            if entry.contains(point) {
                let zone = self.zone(entry);
                if !zones.contains(&zone) {
                    zones.push(zone);
                }
            }
        }
        Ok(zones)
    }

    /// Distinct zone identifiers present in the index, in the order they first
    /// appeared in the source.
    pub fn known_zone_ids(&self) -> Vec<ZoneId> {
        self.zones.clone()
    }

    /// Statistics gathered while building.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Region the index was restricted to.
    pub fn region(&self) -> &BoundingRegion {
        &self.region
    }

    /// Number of stored polygons.
    pub fn polygon_count(&self) -> usize {
        self.tree.size()
    }

    /// Number of distinct zones.
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    fn sorted_candidates(&self, point: Coordinate) -> Candidates<'_> {
        let mut candidates: Candidates<'_> = self.tree.locate_all_at_point(&point.to_point()).collect();
        candidates.sort_unstable_by_key(|entry| entry.sequence);
        candidates
    }

    fn zone(&self, entry: &IndexEntry) -> ZoneId {
        self.zones[entry.zone as usize].clone()
    }
}

fn checked(latitude: f64, longitude: f64) -> Result<Coordinate> {
    let point = Coordinate::new(latitude, longitude);
    if point.is_valid() {
        Ok(point)
    } else {
        Err(TzShapeError::InvalidCoordinate { latitude, longitude })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawPolygon;

    fn rect(zone: &str, min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<GeometryRecord> {
        Ok(GeometryRecord::new(
            zone,
            RawPolygon {
                exterior: vec![
                    Coordinate::new(min_lat, min_lon),
                    Coordinate::new(min_lat, max_lon),
                    Coordinate::new(max_lat, max_lon),
                    Coordinate::new(max_lat, min_lon),
                ],
                holes: Vec::new(),
            },
        ))
    }

    /// Two side by side zones sharing the lon 10 border, plus an overlap.
    fn sample() -> Vec<Result<GeometryRecord>> {
        vec![
            rect("West", 0.0, 0.0, 10.0, 10.0),
            rect("East", 0.0, 10.0, 10.0, 20.0),
            rect("Overlay", 4.0, 4.0, 6.0, 16.0),
            rect("West", 20.0, 0.0, 30.0, 10.0),
        ]
    }

    fn build(records: Vec<Result<GeometryRecord>>, region: BoundingRegion) -> SpatialIndex {
        SpatialIndex::build(records, 0, region, &IndexOptions::default()).unwrap()
    }

    #[test]
    fn test_point_lookup() {
        let index = build(sample(), BoundingRegion::world());

        assert_eq!(index.query(5.0, 2.0).unwrap().unwrap(), "West");
        assert_eq!(index.query(5.0, 18.0).unwrap().unwrap(), "East");
        assert_eq!(index.query(25.0, 5.0).unwrap().unwrap(), "West");
        assert!(index.query(15.0, 5.0).unwrap().is_none());
        assert!(index.query(-45.0, 120.0).unwrap().is_none());
    }

    #[test]
    fn test_earlier_record_wins_on_overlap_and_shared_border() {
        let index = build(sample(), BoundingRegion::world());

        // On the shared border both West and East contain the point
        assert_eq!(index.query(2.0, 10.0).unwrap().unwrap(), "West");
        // Overlay lies on top of both, but comes later in the source
        assert_eq!(index.query(5.0, 14.0).unwrap().unwrap(), "East");
        assert_eq!(
            index.candidates(5.0, 14.0).unwrap(),
            vec![ZoneId::new("East"), ZoneId::new("Overlay")]
        );
        assert_eq!(
            index.candidates(5.0, 10.0).unwrap(),
            vec![ZoneId::new("West"), ZoneId::new("East"), ZoneId::new("Overlay")]
        );
    }

    #[test]
    fn test_known_zones_are_distinct_and_ordered() {
        let index = build(sample(), BoundingRegion::world());

        assert_eq!(
            index.known_zone_ids(),
            vec![ZoneId::new("West"), ZoneId::new("East"), ZoneId::new("Overlay")]
        );
        assert_eq!(index.zone_count(), 3);
        assert_eq!(index.polygon_count(), 4);
    }

    #[test]
    fn test_invalid_coordinates_are_rejected() {
        let index = build(sample(), BoundingRegion::world());

        for (lat, lon) in [(90.5, 0.0), (-91.0, 0.0), (0.0, 180.01), (0.0, -200.0), (f64::NAN, 0.0)] {
            let err = index.query(lat, lon).unwrap_err();
            assert!(matches!(err, TzShapeError::InvalidCoordinate { .. }), "{lat},{lon}");
        }
        assert!(index.query(90.0, 180.0).unwrap().is_none());
        assert!(index.query(-90.0, -180.0).unwrap().is_none());
    }

    #[test]
    fn test_region_discards_and_clips() {
        let region = BoundingRegion::new(0.0, 5.0, 15.0, 25.0).unwrap();
        let index = build(sample(), region);
        let stats = index.stats();

        // The northern West polygon lies entirely outside
        assert_eq!(stats.records_read, 4);
        assert_eq!(stats.records_discarded, 1);
        assert_eq!(stats.polygons, 3);
        assert_eq!(stats.polygons_clipped, 2);
        assert_eq!(index.query(5.0, 7.0).unwrap().unwrap(), "West");
        assert!(index.query(5.0, 2.0).unwrap().is_none());
        assert!(index.query(25.0, 5.0).unwrap().is_none());

        let bounds = stats.bounds.unwrap();
        assert_eq!(bounds.min_lon, 5.0);
        assert_eq!(bounds.max_lon, 20.0);
    }

    fn shape(zone: &str, exterior: &[(f64, f64)], holes: &[&[(f64, f64)]]) -> Result<GeometryRecord> {
        fn ring(points: &[(f64, f64)]) -> Vec<Coordinate> {
            points.iter().map(|&(lat, lon)| Coordinate::new(lat, lon)).collect()
        }
        Ok(GeometryRecord::new(
            zone,
            RawPolygon {
                exterior: ring(exterior),
                holes: holes.iter().map(|hole| ring(hole)).collect(),
            },
        ))
    }

    fn clipped_and_whole(
        records: impl Fn() -> Vec<Result<GeometryRecord>>,
        region: BoundingRegion,
    ) -> (SpatialIndex, SpatialIndex) {
        let whole = IndexOptions {
            clip_to_region: false,
            ..IndexOptions::default()
        };
        let clipped = build(records(), region);
        let unclipped = SpatialIndex::build(records(), 0, region, &whole).unwrap();
        (clipped, unclipped)
    }

    /// U opening to the south; the region border cuts across both arms.
    fn u_shape() -> Vec<Result<GeometryRecord>> {
        vec![shape(
            "Test/U",
            &[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0), (0.0, 2.0), (2.0, 2.0), (2.0, 1.0), (0.0, 1.0)],
            &[],
        )]
    }

    #[test]
    fn test_clipped_gap_between_arms_stays_empty() {
        let region = BoundingRegion::new(-10.0, -10.0, 1.5, 10.0).unwrap();
        let (clipped, unclipped) = clipped_and_whole(u_shape, region);

        assert_eq!(clipped.stats().polygons_clipped, 1);
        for (lat, lon) in [(1.5, 1.5), (1.5, 1.2), (1.5, 1.8), (1.0, 1.5)] {
            assert!(clipped.query(lat, lon).unwrap().is_none(), "lookup at {lat}, {lon}");
            assert!(unclipped.query(lat, lon).unwrap().is_none(), "lookup at {lat}, {lon}");
        }
        for (lat, lon) in [(1.5, 0.5), (1.5, 1.0), (1.5, 2.5), (1.0, 2.0), (0.0, 0.0)] {
            assert_eq!(clipped.query(lat, lon).unwrap().unwrap(), "Test/U", "lookup at {lat}, {lon}");
        }
        // North of the region only the unclipped build answers
        assert!(clipped.query(2.5, 1.5).unwrap().is_none());
        assert_eq!(unclipped.query(2.5, 1.5).unwrap().unwrap(), "Test/U");
    }

    #[test]
    fn test_region_border_matches_unclipped_answers() {
        let records = || {
            let mut records = u_shape();
            records.push(shape(
                "Test/Holed",
                &[(0.0, 5.0), (0.0, 15.0), (10.0, 15.0), (10.0, 5.0)],
                &[&[(4.0, 9.0), (4.0, 11.0), (6.0, 11.0), (6.0, 9.0)]],
            ));
            records.push(rect("Test/Island", 4.0, 9.0, 6.0, 11.0));
            records
        };

        for max_lat in [0.0, 1.5, 2.5, 5.0] {
            let region = BoundingRegion::new(-10.0, -10.0, max_lat, 20.0).unwrap();
            let (clipped, unclipped) = clipped_and_whole(records, region);

            let mut lon = -1.0;
            while lon <= 16.0 {
                for lat in [max_lat, max_lat - 0.25] {
                    assert_eq!(
                        clipped.query(lat, lon).unwrap(),
                        unclipped.query(lat, lon).unwrap(),
                        "lookup at {lat}, {lon}"
                    );
                    assert_eq!(
                        clipped.candidates(lat, lon).unwrap(),
                        unclipped.candidates(lat, lon).unwrap(),
                        "candidates at {lat}, {lon}"
                    );
                }
                lon += 0.25;
            }
        }
    }

    #[test]
    fn test_hole_cut_by_region_border() {
        let records = || {
            vec![
                shape(
                    "Test/Holed",
                    &[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)],
                    &[&[(4.0, 4.0), (4.0, 6.0), (6.0, 6.0), (6.0, 4.0)]],
                ),
                rect("Test/Island", 4.0, 4.0, 6.0, 6.0),
            ]
        };
        let region = BoundingRegion::new(-10.0, -10.0, 5.0, 20.0).unwrap();
        let (clipped, unclipped) = clipped_and_whole(records, region);

        assert_eq!(clipped.stats().polygons_clipped, 2);
        for index in [&clipped, &unclipped] {
            assert_eq!(index.query(5.0, 5.0).unwrap().unwrap(), "Test/Island");
            assert_eq!(index.query(4.5, 5.5).unwrap().unwrap(), "Test/Island");
            assert_eq!(index.query(5.0, 2.0).unwrap().unwrap(), "Test/Holed");
            // Hole boundary belongs to the holed polygon, which comes first
            assert_eq!(index.query(5.0, 4.0).unwrap().unwrap(), "Test/Holed");
        }
    }

    #[test]
    fn test_unclipped_build_keeps_whole_polygons() {
        let region = BoundingRegion::new(0.0, 5.0, 15.0, 25.0).unwrap();
        let options = IndexOptions {
            clip_to_region: false,
            ..IndexOptions::default()
        };
        let index = SpatialIndex::build(sample(), 0, region, &options).unwrap();

        assert_eq!(index.stats().polygons_clipped, 0);
        assert_eq!(index.query(5.0, 2.0).unwrap().unwrap(), "West");
    }

    #[test]
    fn test_empty_source_builds_empty_index() {
        let index = build(Vec::new(), BoundingRegion::world());

        assert!(index.query(0.0, 0.0).unwrap().is_none());
        assert!(index.known_zone_ids().is_empty());
        assert_eq!(index.stats().depth, 0);
        assert!(index.stats().bounds.is_none());
    }

    #[test]
    fn test_source_error_aborts_build() {
        let mut records = sample();
        records.insert(1, Err(TzShapeError::data_acquisition("test", "stream broke")));

        let err = SpatialIndex::build(records, 0, BoundingRegion::world(), &IndexOptions::default()).unwrap_err();
        assert!(matches!(err, TzShapeError::DataAcquisitionFailure { .. }));
    }

    #[test]
    fn test_malformed_polygon_aborts_build() {
        let mut records = sample();
        records.push(Ok(GeometryRecord::new(
            "Broken",
            RawPolygon {
                exterior: vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)],
                holes: Vec::new(),
            },
        )));

        for parallel_build in [true, false] {
            let options = IndexOptions {
                parallel_build,
                ..IndexOptions::default()
            };
            let err = SpatialIndex::build(records.iter().map(clone_record), 0, BoundingRegion::world(), &options)
                .unwrap_err();
            match err {
                TzShapeError::MalformedGeometry { zone_id, .. } => assert_eq!(zone_id, "Broken"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_empty_zone_id_is_malformed() {
        let err = SpatialIndex::build(
            vec![rect("  ", 0.0, 0.0, 1.0, 1.0)],
            1,
            BoundingRegion::world(),
            &IndexOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TzShapeError::MalformedGeometry { .. }));
    }

    #[test]
    fn test_tree_envelopes_nest() {
        let mut records = Vec::new();
        for i in 0..40 {
            for j in 0..20 {
                let lat = -80.0 + j as f64 * 8.0;
                let lon = -180.0 + i as f64 * 9.0;
                records.push(rect(&format!("Grid/{i}_{j}"), lat, lon, lat + 8.0, lon + 9.0));
            }
        }
        let index = build(records, BoundingRegion::world());

        assert_eq!(index.polygon_count(), 800);
        assert!(index.stats().depth >= 2);
        assert!(index.stats().internal_nodes >= 1);
        assert!(stats::envelopes_nest(index.tree.root()));
        assert_eq!(index.query(-76.0, -175.0).unwrap().unwrap(), "Grid/0_0");
        assert_eq!(index.query(77.0, 175.0).unwrap().unwrap(), "Grid/39_19");
    }

    #[test]
    fn test_query_many_preserves_order() {
        let index = build(sample(), BoundingRegion::world());
        let points = [
            Coordinate::new(5.0, 18.0),
            Coordinate::new(95.0, 0.0),
            Coordinate::new(5.0, 2.0),
            Coordinate::new(15.0, 5.0),
        ];

        let results = index.query_many(&points);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().as_ref().unwrap(), "East");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().as_ref().unwrap(), "West");
        assert!(results[3].as_ref().unwrap().is_none());
    }

    fn clone_record(record: &Result<GeometryRecord>) -> Result<GeometryRecord> {
        match record {
            Ok(record) => Ok(record.clone()),
            Err(err) => panic!("unexpected error in fixture: {err}"),
        }
    }
}
