//! Core overlay and resampling modules

pub mod cycle;
pub mod overlay;
pub mod resample;
pub mod spatial_index;

// Re-export main types
pub use cycle::{cycles_to_cover, extend_cycles, SWOT_CYCLE_SECONDS};
pub use overlay::{
    count_overlays_per_reach, IndexSide, OverlayEngine, OverlayOptions, OverlayPredicate,
};
pub use resample::{match_and_join, nearest_time_step, ResampledDischarge};
pub use spatial_index::BoundsIndex;
