//! Index construction pipeline
//!
//! The source is drained once, in order, on the calling thread. Geometry is
//! then validated, filtered against the region and clipped, optionally on the
//! rayon pool. Finally zones are interned and the R*-tree is bulk loaded.
//!
//! Clipping only narrows what the tree sees. A clipped entry keeps its source
//! polygon and answers exact tests as "inside the region and inside the
//! polygon", so the clipped ring itself is used for its extent alone.

use super::entry::IndexEntry;
use super::stats::{IndexStats, TreeShape};
use super::SpatialIndex;
use crate::config::IndexOptions;
use crate::error::{Result, TzShapeError};
use crate::geometry::Polygon;
use crate::region::BoundingRegion;
use crate::source::GeometryRecord;
use crate::types::{BoundingBox, ZoneId};
use rayon::prelude::*;
use rstar::RTree;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// What happened to a single source record.
enum Prepared {
    /// Bounding box misses the region entirely
    Discarded,
    Retained {
        zone_id: String,
        polygon: Polygon,
        /// Bounds of the part that lies inside the region
        extent: BoundingBox,
        /// Set when the polygon was clipped to the region bounds
        window: Option<BoundingBox>,
    },
}

fn prepare(record: GeometryRecord, region: &BoundingRegion, options: &IndexOptions) -> Result<Prepared> {
    let GeometryRecord { zone_id, polygon } = record;

    if zone_id.trim().is_empty() {
        return Err(TzShapeError::malformed(zone_id, "zone identifier is empty"));
    }

    let polygon = Polygon::from_coordinates(&polygon.exterior, &polygon.holes)
        .map_err(|e| TzShapeError::malformed(&zone_id, e.to_string()))?;
    let bbox = polygon.bounding_box();

    if !region.intersects(&bbox) {
        return Ok(Prepared::Discarded);
    }

    if options.clip_to_region && !region.covers(&bbox) {
        let window = region.bounds();
        let extent = match polygon.clip_to(&window) {
            Some(clipped) => clipped.bounding_box(),
            None => {
                // Border points may still belong to it
                debug!("Polygon of {} has no area inside the region", zone_id);
                overlap(bbox, window)
            }
        };
        return Ok(Prepared::Retained {
            zone_id,
            polygon,
            extent,
            window: Some(window),
        });
    }

    Ok(Prepared::Retained {
        zone_id,
        polygon,
        extent: bbox,
        window: None,
    })
}

/// Builds an index from `records`.
///
/// `expected` pre-sizes internal buffers and may be `0` when unknown. The
/// first error from the source or from any record aborts the build.
pub(crate) fn build<I>(
    records: I,
    expected: usize,
    region: BoundingRegion,
    options: &IndexOptions,
) -> Result<SpatialIndex>
where
    I: IntoIterator<Item = Result<GeometryRecord>>,
{
    let started = Instant::now();
    info!(
        "Building time zone index for region {} ({} records expected)",
        region, expected
    );

    let mut raw = Vec::with_capacity(expected);
    for record in records {
        raw.push(record?);
    }
    let records_read = raw.len();
    debug!("Read {} geometry records in {:?}", records_read, started.elapsed());

    let prepared: Vec<Prepared> = if options.parallel_build {
        raw.into_par_iter()
            .map(|record| prepare(record, &region, options))
            .collect::<Result<_>>()?
    } else {
        raw.into_iter()
            .map(|record| prepare(record, &region, options))
            .collect::<Result<_>>()?
    };

    let mut zones: Vec<ZoneId> = Vec::new();
    let mut zone_lookup: HashMap<String, u32> = HashMap::new();
    let mut entries = Vec::with_capacity(prepared.len());
    let mut stats = IndexStats {
        records_read,
        ..IndexStats::default()
    };

    for (sequence, outcome) in prepared.into_iter().enumerate() {
        match outcome {
            Prepared::Discarded => stats.records_discarded += 1,
            Prepared::Retained {
                zone_id,
                polygon,
                extent,
                window,
            } => {
                let zone = match zone_lookup.get(&zone_id) {
                    Some(&zone) => zone,
                    None => {
                        let zone = zones.len() as u32;
                        zones.push(ZoneId::new(&zone_id));
                        zone_lookup.insert(zone_id, zone);
                        zone
                    }
                };

                stats.vertices += polygon.vertex_count();
                stats.bounds = Some(match stats.bounds {
                    Some(bounds) => union(bounds, extent),
                    None => extent,
                });
                entries.push(match window {
                    Some(window) => {
                        stats.polygons_clipped += 1;
                        IndexEntry::clipped(sequence, zone, polygon, window, extent)
                    }
                    None => IndexEntry::new(sequence, zone, polygon),
                });
            }
        }
    }

    stats.polygons = entries.len();
    stats.zones = zones.len();

    let tree = RTree::bulk_load(entries);
    let shape = TreeShape::measure(tree.root());
    stats.depth = shape.depth;
    stats.leaf_nodes = shape.leaf_nodes;
    stats.internal_nodes = shape.internal_nodes;
    stats.build_millis = started.elapsed().as_millis() as u64;

    info!(
        "Time zone index ready: {} polygons in {} zones ({} vertices), {} discarded, {} clipped, depth {}, built in {} ms",
        stats.polygons,
        stats.zones,
        stats.vertices,
        stats.records_discarded,
        stats.polygons_clipped,
        stats.depth,
        stats.build_millis
    );

    Ok(SpatialIndex {
        tree,
        zones,
        region,
        stats,
    })
}

fn union(a: BoundingBox, b: BoundingBox) -> BoundingBox {
    BoundingBox::new(
        a.min_lat.min(b.min_lat),
        a.min_lon.min(b.min_lon),
        a.max_lat.max(b.max_lat),
        a.max_lon.max(b.max_lon),
    )
}

/// Common part of two boxes already known to intersect.
fn overlap(a: BoundingBox, b: BoundingBox) -> BoundingBox {
    BoundingBox::new(
        a.min_lat.max(b.min_lat),
        a.min_lon.max(b.min_lon),
        a.max_lat.min(b.max_lat),
        a.max_lon.min(b.max_lon),
    )
}
