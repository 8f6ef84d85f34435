//! riverpass: A Fast, Modular Resampler of River Discharge onto Satellite Overpass Times
//!
//! This library pairs river reach geometries with satellite swath footprints,
//! extends the resulting overpass table across orbit repeat cycles, and
//! resamples model discharge series onto the overpass times. It was built for
//! SWOT-style altimetry studies driven by RAPID river routing output, but the
//! geometry, timing, and model layers are all plain shapefile/CSV/NetCDF
//! inputs with no mission-specific assumptions beyond the defaults.
//!
//! Processing runs in three stages:
//!
//! 1. [`OverlayEngine`](crate::core::OverlayEngine) finds every reach/swath
//!    pair passing a geometric predicate and stamps it with the swath mean
//!    time.
//! 2. [`extend_cycles`](crate::core::extend_cycles) replicates those records
//!    across orbit repeat cycles.
//! 3. [`match_and_join`](crate::core::match_and_join) snaps each record to
//!    the nearest model time step and joins the discharge value.

pub mod core;
pub mod io;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    ModelSeries, OverlayCount, OverlayRecord, PassError, PassResult, ReachFeature, ReachId,
    ResampledRecord, SeriesRow, SwathFeature,
};

pub use crate::core::{
    count_overlays_per_reach, cycles_to_cover, extend_cycles, match_and_join, nearest_time_step,
    IndexSide, OverlayEngine, OverlayOptions, OverlayPredicate, ResampledDischarge,
    SWOT_CYCLE_SECONDS,
};

pub use io::{DischargeReader, ReachReader, SwathReader, DEFAULT_MODEL_DT_SECONDS};
