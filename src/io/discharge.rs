use crate::types::{ModelSeries, PassResult};
use std::path::Path;

#[cfg(feature = "netcdf")]
use crate::types::{PassError, ReachId};
#[cfg(feature = "netcdf")]
use log::info;
#[cfg(feature = "netcdf")]
use ndarray::Array2;

/// RAPID output time step, in seconds (3 hours).
pub const DEFAULT_MODEL_DT_SECONDS: f64 = 10_800.0;

/// NetCDF variable holding the discharge matrix.
pub const DISCHARGE_VARIABLE: &str = "Qout";

/// NetCDF variables tried, in order, for the reach identifier vector.
pub const REACH_ID_VARIABLES: [&str; 2] = ["COMID", "rivid"];

/// Reads model discharge series from RAPID NetCDF output or from CSV rows.
pub struct DischargeReader;

impl DischargeReader {
    /// Load a discharge series, dispatching on the file extension.
    ///
    /// `.nc`/`.nc4` files are read as RAPID output with time steps derived
    /// from `model_dt` (step `i` sits at `i * model_dt` seconds); anything
    /// else is read as a reach/time/discharge CSV where `model_dt` is
    /// ignored.
    pub fn read<P: AsRef<Path>>(path: P, model_dt: f64) -> PassResult<ModelSeries> {
        let path = path.as_ref();
        let is_netcdf = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("nc") | Some("nc4")
        );
        if is_netcdf {
            Self::read_netcdf(path, model_dt)
        } else {
            crate::io::tables::read_series_csv(path)
        }
    }

    #[cfg(feature = "netcdf")]
    fn read_netcdf(path: &Path, model_dt: f64) -> PassResult<ModelSeries> {
        let file = netcdf::open(path)?;

        let id_var = REACH_ID_VARIABLES
            .iter()
            .find_map(|name| file.variable(name))
            .ok_or_else(|| {
                PassError::Schema(format!(
                    "neither {} exist in {}",
                    REACH_ID_VARIABLES.join(" nor "),
                    path.display()
                ))
            })?;
        let reach_ids: Vec<ReachId> = id_var.get_values(..)?;

        let discharge_var = file.variable(DISCHARGE_VARIABLE).ok_or_else(|| {
            PassError::Schema(format!(
                "variable {} missing from {}",
                DISCHARGE_VARIABLE,
                path.display()
            ))
        })?;
        let dims = discharge_var.dimensions();
        if dims.len() != 2 {
            return Err(PassError::Schema(format!(
                "variable {} in {} has {} dimensions, expected 2",
                DISCHARGE_VARIABLE,
                path.display(),
                dims.len()
            )));
        }
        let (d0, d1) = (dims[0].len(), dims[1].len());
        let values: Vec<f64> = discharge_var.get_values(..)?;
        let matrix = Array2::from_shape_vec((d0, d1), values).map_err(|e| {
            PassError::Processing(format!(
                "variable {} in {} is not rectangular: {}",
                DISCHARGE_VARIABLE,
                path.display(),
                e
            ))
        })?;

        // RAPID writes Qout as (time, rivid); tolerate the transpose.
        let matrix = if d1 == reach_ids.len() {
            matrix
        } else if d0 == reach_ids.len() {
            matrix.reversed_axes()
        } else {
            return Err(PassError::Schema(format!(
                "variable {} in {} is {}x{} but {} reach ids were read",
                DISCHARGE_VARIABLE,
                path.display(),
                d0,
                d1,
                reach_ids.len()
            )));
        };

        let n_times = matrix.dim().0;
        let time_steps: Vec<f64> = (0..n_times).map(|i| i as f64 * model_dt).collect();

        info!(
            "Loaded discharge for {} reaches x {} time steps from {}",
            reach_ids.len(),
            n_times,
            path.display()
        );
        ModelSeries::from_matrix(&reach_ids, &time_steps, &matrix)
    }

    #[cfg(not(feature = "netcdf"))]
    fn read_netcdf(path: &Path, _model_dt: f64) -> PassResult<ModelSeries> {
        Err(crate::types::PassError::Processing(format!(
            "reading {} requires the netcdf feature",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeriesRow;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_csv_series() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("series.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "reach_id,time_step,discharge").unwrap();
        writeln!(f, "101,0.0,1.5").unwrap();
        writeln!(f, "101,10800.0,2.5").unwrap();
        drop(f);

        let series = DischargeReader::read(&path, DEFAULT_MODEL_DT_SECONDS).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.rows[0],
            SeriesRow { reach_id: 101, time_step: 0.0, discharge: 1.5 }
        );
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_read_rapid_netcdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Qout.nc");

        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("time", 3).unwrap();
            file.add_dimension("rivid", 2).unwrap();

            let mut ids = file.add_variable::<i64>("rivid", &["rivid"]).unwrap();
            ids.put_values(&[101_i64, 102], ..).unwrap();

            let mut qout = file.add_variable::<f64>("Qout", &["time", "rivid"]).unwrap();
            qout.put_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], ..).unwrap();
        }

        let series = DischargeReader::read(&path, 10_800.0).unwrap();
        assert_eq!(series.len(), 6);
        assert_eq!(
            series.rows[0],
            SeriesRow { reach_id: 101, time_step: 0.0, discharge: 1.0 }
        );
        assert_eq!(
            series.rows[5],
            SeriesRow { reach_id: 102, time_step: 21_600.0, discharge: 6.0 }
        );
        assert!(series.validate_uniform_schedule().is_ok());
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn test_netcdf_path_without_feature_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(DischargeReader::read(dir.path().join("Qout.nc"), 10_800.0).is_err());
    }
}
