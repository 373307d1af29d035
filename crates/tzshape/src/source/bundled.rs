/// Sample dataset compiled into the library
use super::{FeatureCollectionRecords, RecordStream};
use crate::error::Result;
use std::io::Cursor;

/// Origin label used in logs and errors for the bundled dataset.
pub const BUNDLED_ORIGIN: &str = "bundled:world_sample.geojson";

/// Coarse outlines of the main zones of every inhabited continent.
///
/// Major cities resolve correctly, but coastlines and borders are a few
/// vertices each and small states are missing. Real deployments should load
/// a timezone-boundary-builder release with [`super::open_path`].
static WORLD_SAMPLE: &str = include_str!("../../data/world_sample.geojson");

/// Record stream over the bundled dataset.
pub fn bundled_records() -> Result<RecordStream> {
    let records = FeatureCollectionRecords::from_reader(Cursor::new(WORLD_SAMPLE), BUNDLED_ORIGIN)?;
    let expected = records.len();
    Ok(RecordStream::new(records, expected, BUNDLED_ORIGIN))
}
