use crate::core::spatial_index::BoundsIndex;
use crate::types::{OverlayCount, OverlayRecord, ReachFeature, SwathFeature};
use geo::{Contains, Intersects};
use geo_types::Geometry;
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Geometric test deciding whether a swath footprint overlays a reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPredicate {
    /// Swath and reach share at least one point (boundary contact counts).
    Intersects,
    /// Swath polygon fully contains the reach line, boundary excluded per
    /// the usual DE-9IM contains definition.
    #[default]
    Contains,
}

impl OverlayPredicate {
    /// Apply the predicate. The swath is always the container side.
    pub fn holds(&self, swath: &Geometry<f64>, reach: &Geometry<f64>) -> bool {
        match self {
            OverlayPredicate::Intersects => swath.intersects(reach),
            OverlayPredicate::Contains => swath.contains(reach),
        }
    }
}

impl fmt::Display for OverlayPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayPredicate::Intersects => write!(f, "intersects"),
            OverlayPredicate::Contains => write!(f, "contains"),
        }
    }
}

impl FromStr for OverlayPredicate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "intersects" => Ok(OverlayPredicate::Intersects),
            "contains" => Ok(OverlayPredicate::Contains),
            other => Err(format!(
                "unknown overlay predicate '{}', expected 'intersects' or 'contains'",
                other
            )),
        }
    }
}

/// Which feature collection the spatial index is built over. The other side
/// is streamed against the index. Either choice yields the same record
/// multiset; the better one is the larger collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexSide {
    #[default]
    Reaches,
    Swaths,
}

impl fmt::Display for IndexSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSide::Reaches => write!(f, "reaches"),
            IndexSide::Swaths => write!(f, "swaths"),
        }
    }
}

impl FromStr for IndexSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reaches" => Ok(IndexSide::Reaches),
            "swaths" => Ok(IndexSide::Swaths),
            other => Err(format!(
                "unknown index side '{}', expected 'reaches' or 'swaths'",
                other
            )),
        }
    }
}

/// Overlay configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayOptions {
    pub predicate: OverlayPredicate,
    pub index_side: IndexSide,
    /// Skip pairs at equal positions in both collections. Only meaningful
    /// when the same file is loaded as both sides, where every feature
    /// trivially overlays itself.
    pub exclude_self: bool,
}

/// Computes the overlay table: every (reach, swath) pair passing the
/// geometric predicate, stamped with the swath mean time.
#[derive(Debug, Clone)]
pub struct OverlayEngine {
    options: OverlayOptions,
}

impl Default for OverlayEngine {
    fn default() -> Self {
        Self::new(OverlayPredicate::default())
    }
}

impl OverlayEngine {
    pub fn new(predicate: OverlayPredicate) -> Self {
        Self {
            options: OverlayOptions { predicate, ..OverlayOptions::default() },
        }
    }

    pub fn with_options(options: OverlayOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    /// Build the overlay table for `reaches` x `swaths`.
    ///
    /// Pairs are found through a bounding-box index, confirmed with the
    /// exact predicate, and returned sorted ascending by overlay time, ties
    /// kept in discovery order. Features with empty geometries are skipped.
    pub fn overlay(
        &self,
        reaches: &[ReachFeature],
        swaths: &[SwathFeature],
    ) -> Vec<OverlayRecord> {
        info!(
            "Computing overlay: {} reaches x {} swaths (predicate: {}, index: {})",
            reaches.len(),
            swaths.len(),
            self.options.predicate,
            self.options.index_side
        );

        let mut records = match self.options.index_side {
            IndexSide::Reaches => self.overlay_indexed_reaches(reaches, swaths),
            IndexSide::Swaths => self.overlay_indexed_swaths(reaches, swaths),
        };

        records.sort_by(|a, b| a.overlay_time.total_cmp(&b.overlay_time));
        info!("Overlay complete: {} records", records.len());
        records
    }

    fn overlay_indexed_reaches(
        &self,
        reaches: &[ReachFeature],
        swaths: &[SwathFeature],
    ) -> Vec<OverlayRecord> {
        let index = BoundsIndex::from_bounds(
            reaches
                .iter()
                .enumerate()
                .filter_map(|(pos, reach)| reach.bounds().map(|b| (pos, b))),
        );
        debug!("Indexed {} reach envelopes", index.len());

        let scan = |(swath_pos, swath): (usize, &SwathFeature)| -> Vec<OverlayRecord> {
            let Some(bounds) = swath.bounds() else {
                return Vec::new();
            };
            let mut candidates = index.query(&bounds);
            candidates.sort_unstable();
            candidates
                .into_iter()
                .filter(|&reach_pos| !(self.options.exclude_self && reach_pos == swath_pos))
                .filter(|&reach_pos| {
                    self.options.predicate.holds(&swath.shape, &reaches[reach_pos].shape)
                })
                .map(|reach_pos| OverlayRecord {
                    reach_id: reaches[reach_pos].id,
                    overlay_time: swath.mean_time,
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        {
            swaths.par_iter().enumerate().map(|(pos, s)| scan((pos, s))).flatten().collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            swaths.iter().enumerate().flat_map(scan).collect()
        }
    }

    fn overlay_indexed_swaths(
        &self,
        reaches: &[ReachFeature],
        swaths: &[SwathFeature],
    ) -> Vec<OverlayRecord> {
        let index = BoundsIndex::from_bounds(
            swaths
                .iter()
                .enumerate()
                .filter_map(|(pos, swath)| swath.bounds().map(|b| (pos, b))),
        );
        debug!("Indexed {} swath envelopes", index.len());

        let scan = |(reach_pos, reach): (usize, &ReachFeature)| -> Vec<OverlayRecord> {
            let Some(bounds) = reach.bounds() else {
                return Vec::new();
            };
            let mut candidates = index.query(&bounds);
            candidates.sort_unstable();
            candidates
                .into_iter()
                .filter(|&swath_pos| !(self.options.exclude_self && swath_pos == reach_pos))
                .filter(|&swath_pos| {
                    self.options.predicate.holds(&swaths[swath_pos].shape, &reach.shape)
                })
                .map(|swath_pos| OverlayRecord {
                    reach_id: reach.id,
                    overlay_time: swaths[swath_pos].mean_time,
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        {
            reaches.par_iter().enumerate().map(|(pos, r)| scan((pos, r))).flatten().collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            reaches.iter().enumerate().flat_map(scan).collect()
        }
    }
}

/// Per-reach overlay counts, one entry per loaded reach in load order.
/// Reaches no swath touched report zero.
pub fn count_overlays_per_reach(
    reaches: &[ReachFeature],
    records: &[OverlayRecord],
) -> Vec<OverlayCount> {
    let mut by_id: HashMap<crate::types::ReachId, usize> = HashMap::new();
    for record in records {
        *by_id.entry(record.reach_id).or_insert(0) += 1;
    }

    reaches
        .iter()
        .map(|reach| OverlayCount {
            reach_id: reach.id,
            overlays: by_id.get(&reach.id).copied().unwrap_or(0),
        })
        .collect()
}
