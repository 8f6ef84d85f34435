//! I/O modules for reading river networks, swath footprints, and discharge

pub mod discharge;
pub mod tables;
pub mod vector;

pub use discharge::{DischargeReader, DEFAULT_MODEL_DT_SECONDS};
pub use tables::{
    read_overlay_csv, read_series_csv, write_overlay_counts_csv, write_overlay_csv,
    write_resampled_csv,
};
pub use vector::{ReachReader, SwathReader};
