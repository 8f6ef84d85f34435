use geo::BoundingRect;
use geo_types::{Geometry, Rect};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// River reach identifier (COMID/ARCID attribute). Not guaranteed unique
/// within a collection; positional indices are used wherever uniqueness
/// matters.
pub type ReachId = i64;

/// A river reach feature: model identifier plus line geometry.
#[derive(Debug, Clone)]
pub struct ReachFeature {
    pub id: ReachId,
    pub shape: Geometry<f64>,
}

impl ReachFeature {
    pub fn new(id: ReachId, shape: Geometry<f64>) -> Self {
        Self { id, shape }
    }

    /// Axis-aligned bounding rectangle, recomputed from the shape on every
    /// call. `None` for empty geometries, which cannot overlay anything.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shape.bounding_rect()
    }
}

/// One satellite swath footprint: polygon geometry plus the mean overpass
/// time of that pass, in seconds on the orbit reference clock.
#[derive(Debug, Clone)]
pub struct SwathFeature {
    pub mean_time: f64,
    pub shape: Geometry<f64>,
}

impl SwathFeature {
    pub fn new(mean_time: f64, shape: Geometry<f64>) -> Self {
        Self { mean_time, shape }
    }

    /// Axis-aligned bounding rectangle, recomputed from the shape on every
    /// call.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shape.bounding_rect()
    }
}

/// One spatial coincidence between a reach and a swath, stamped with the
/// swath's mean overpass time. A reach may appear any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayRecord {
    pub reach_id: ReachId,
    pub overlay_time: f64,
}

/// Number of swath passes overlaying one reach, in reach load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayCount {
    pub reach_id: ReachId,
    pub overlays: usize,
}

/// One model output value: discharge for one reach at one time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub reach_id: ReachId,
    pub time_step: f64,
    pub discharge: f64,
}

/// Discharge time series flattened to rows, one per reach per time step.
/// Time steps are expected to follow a single schedule shared by all
/// reaches; see [`ModelSeries::validate_uniform_schedule`].
#[derive(Debug, Clone, Default)]
pub struct ModelSeries {
    pub rows: Vec<SeriesRow>,
}

impl ModelSeries {
    pub fn new(rows: Vec<SeriesRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flatten a time-major discharge matrix (time step x reach) into rows,
    /// the layout used by RAPID `Qout` output.
    pub fn from_matrix(
        reach_ids: &[ReachId],
        time_steps: &[f64],
        discharge: &Array2<f64>,
    ) -> PassResult<Self> {
        let (n_times, n_reaches) = discharge.dim();
        if n_times != time_steps.len() || n_reaches != reach_ids.len() {
            return Err(PassError::Processing(format!(
                "discharge matrix is {}x{} but {} time steps and {} reach ids were supplied",
                n_times,
                n_reaches,
                time_steps.len(),
                reach_ids.len()
            )));
        }

        let mut rows = Vec::with_capacity(n_times * n_reaches);
        for (ti, &time_step) in time_steps.iter().enumerate() {
            for (ri, &reach_id) in reach_ids.iter().enumerate() {
                rows.push(SeriesRow {
                    reach_id,
                    time_step,
                    discharge: discharge[[ti, ri]],
                });
            }
        }
        Ok(Self { rows })
    }

    /// Earliest and latest time step present, if any.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        let mut span: Option<(f64, f64)> = None;
        for row in &self.rows {
            span = Some(match span {
                None => (row.time_step, row.time_step),
                Some((lo, hi)) => (lo.min(row.time_step), hi.max(row.time_step)),
            });
        }
        span
    }

    /// Check that every reach carries an identical time-step sequence.
    ///
    /// Nearest-step matching assumes one global schedule; a series violating
    /// that assumption would be matched against a schedule some of its
    /// reaches never saw. Callers wanting fail-fast behavior run this before
    /// matching.
    pub fn validate_uniform_schedule(&self) -> PassResult<()> {
        let mut per_reach: BTreeMap<ReachId, Vec<f64>> = BTreeMap::new();
        for row in &self.rows {
            per_reach.entry(row.reach_id).or_default().push(row.time_step);
        }

        let mut reference: Option<(ReachId, Vec<f64>)> = None;
        for (reach_id, mut steps) in per_reach {
            steps.sort_by(|a, b| a.total_cmp(b));
            match &reference {
                None => reference = Some((reach_id, steps)),
                Some((ref_id, ref_steps)) => {
                    if steps.len() != ref_steps.len()
                        || steps.iter().zip(ref_steps).any(|(a, b)| a != b)
                    {
                        return Err(PassError::Processing(format!(
                            "model time steps differ between reaches {} and {}",
                            ref_id, reach_id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Final output row: an overlay time paired with the nearest model step and
/// its discharge value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResampledRecord {
    pub reach_id: ReachId,
    pub overlay_time: f64,
    pub matched_time_step: f64,
    pub time_delta: f64,
    pub discharge: f64,
}

/// Error types for overlay and resampling operations
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("processing error: {0}")]
    Processing(String),
}

/// Result type for overlay and resampling operations
pub type PassResult<T> = Result<T, PassError>;

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::line_string;
    use ndarray::array;

    #[test]
    fn test_from_matrix_flattens_time_major() {
        let discharge = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let series = ModelSeries::from_matrix(&[101, 102], &[0.0, 10.0, 20.0], &discharge).unwrap();

        assert_eq!(series.len(), 6);
        assert_eq!(
            series.rows[0],
            SeriesRow { reach_id: 101, time_step: 0.0, discharge: 1.0 }
        );
        assert_eq!(
            series.rows[3],
            SeriesRow { reach_id: 102, time_step: 10.0, discharge: 4.0 }
        );
        assert_eq!(series.time_span(), Some((0.0, 20.0)));
    }

    #[test]
    fn test_from_matrix_rejects_mismatched_shape() {
        let discharge = array![[1.0, 2.0], [3.0, 4.0]];
        let result = ModelSeries::from_matrix(&[101], &[0.0, 10.0], &discharge);
        assert!(result.is_err());
    }

    #[test]
    fn test_uniform_schedule_accepts_shared_steps() {
        let discharge = array![[1.0, 2.0], [3.0, 4.0]];
        let series = ModelSeries::from_matrix(&[101, 102], &[0.0, 10.0], &discharge).unwrap();
        assert!(series.validate_uniform_schedule().is_ok());
    }

    #[test]
    fn test_uniform_schedule_rejects_divergent_steps() {
        let series = ModelSeries::new(vec![
            SeriesRow { reach_id: 101, time_step: 0.0, discharge: 1.0 },
            SeriesRow { reach_id: 101, time_step: 10.0, discharge: 2.0 },
            SeriesRow { reach_id: 102, time_step: 0.0, discharge: 3.0 },
            SeriesRow { reach_id: 102, time_step: 15.0, discharge: 4.0 },
        ]);
        assert!(series.validate_uniform_schedule().is_err());
    }

    #[test]
    fn test_bounds_recomputed_from_shape() {
        let reach = ReachFeature::new(
            7,
            Geometry::LineString(geo_types::line_string![
                (x: 2.0, y: 1.0),
                (x: 5.0, y: 4.0),
            ]),
        );
        let bounds = reach.bounds().unwrap();
        assert_eq!(bounds.min().x, 2.0);
        assert_eq!(bounds.max().y, 4.0);
    }
}
