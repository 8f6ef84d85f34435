use crate::types::{PassError, PassResult, ReachFeature, ReachId, SwathFeature};
use geo_types::Geometry;
use log::info;
use shapefile::dbase::{FieldValue, Record};
use shapefile::Shape;
use std::path::Path;

/// Attribute names tried, in order, for the reach identifier.
pub const REACH_ID_FIELDS: [&str; 2] = ["COMID", "ARCID"];

/// Attribute names tried, in order, for the swath mean overpass time.
pub const SWATH_TIME_FIELDS: [&str; 2] = ["Mean_time", "Mean time"];

/// Reads river reach features from a polyline shapefile.
pub struct ReachReader;

impl ReachReader {
    /// Load every feature, resolving the identifier attribute from
    /// [`REACH_ID_FIELDS`] against the first record.
    pub fn read<P: AsRef<Path>>(path: P) -> PassResult<Vec<ReachFeature>> {
        let path = path.as_ref();
        let mut reader = shapefile::Reader::from_path(path)?;

        let mut field: Option<&str> = None;
        let mut features = Vec::new();
        for pair in reader.iter_shapes_and_records() {
            let (shape, record) = pair?;
            let field = match field {
                Some(f) => f,
                None => {
                    let resolved = resolve_field(&record, &REACH_ID_FIELDS, path)?;
                    field = Some(resolved);
                    resolved
                }
            };
            let id = integer_field(&record, field, path)?;
            features.push(ReachFeature::new(id, to_geometry(shape, path)?));
        }

        info!("Loaded {} reach features from {}", features.len(), path.display());
        Ok(features)
    }
}

/// Reads swath footprint features from a polygon shapefile.
pub struct SwathReader;

impl SwathReader {
    /// Load every feature, resolving the mean-time attribute from
    /// [`SWATH_TIME_FIELDS`] against the first record.
    pub fn read<P: AsRef<Path>>(path: P) -> PassResult<Vec<SwathFeature>> {
        let path = path.as_ref();
        let mut reader = shapefile::Reader::from_path(path)?;

        let mut field: Option<&str> = None;
        let mut features = Vec::new();
        for pair in reader.iter_shapes_and_records() {
            let (shape, record) = pair?;
            let field = match field {
                Some(f) => f,
                None => {
                    let resolved = resolve_field(&record, &SWATH_TIME_FIELDS, path)?;
                    field = Some(resolved);
                    resolved
                }
            };
            let mean_time = float_field(&record, field, path)?;
            features.push(SwathFeature::new(mean_time, to_geometry(shape, path)?));
        }

        info!("Loaded {} swath features from {}", features.len(), path.display());
        Ok(features)
    }
}

fn resolve_field<'a>(
    record: &Record,
    candidates: &[&'a str],
    path: &Path,
) -> PassResult<&'a str> {
    for &name in candidates {
        if record.get(name).is_some() {
            return Ok(name);
        }
    }
    Err(PassError::Schema(format!(
        "neither {} exist in {}",
        candidates.join(" nor "),
        path.display()
    )))
}

fn integer_field(record: &Record, field: &str, path: &Path) -> PassResult<ReachId> {
    match record.get(field) {
        Some(FieldValue::Numeric(Some(v))) => Ok(*v as ReachId),
        Some(FieldValue::Integer(v)) => Ok(*v as ReachId),
        Some(FieldValue::Double(v)) => Ok(*v as ReachId),
        Some(FieldValue::Float(Some(v))) => Ok(*v as ReachId),
        Some(FieldValue::Character(Some(s))) => s.trim().parse::<ReachId>().map_err(|_| {
            PassError::Schema(format!(
                "field {} value '{}' is not an integer in {}",
                field,
                s,
                path.display()
            ))
        }),
        Some(FieldValue::Numeric(None))
        | Some(FieldValue::Float(None))
        | Some(FieldValue::Character(None)) => Err(PassError::Schema(format!(
            "field {} is null in {}",
            field,
            path.display()
        ))),
        Some(other) => Err(PassError::Schema(format!(
            "field {} has unsupported type {:?} in {}",
            field,
            other,
            path.display()
        ))),
        None => Err(PassError::Schema(format!(
            "field {} missing from a record in {}",
            field,
            path.display()
        ))),
    }
}

fn float_field(record: &Record, field: &str, path: &Path) -> PassResult<f64> {
    match record.get(field) {
        Some(FieldValue::Numeric(Some(v))) => Ok(*v),
        Some(FieldValue::Double(v)) => Ok(*v),
        Some(FieldValue::Float(Some(v))) => Ok(*v as f64),
        Some(FieldValue::Integer(v)) => Ok(*v as f64),
        Some(FieldValue::Character(Some(s))) => s.trim().parse::<f64>().map_err(|_| {
            PassError::Schema(format!(
                "field {} value '{}' is not a number in {}",
                field,
                s,
                path.display()
            ))
        }),
        Some(FieldValue::Numeric(None))
        | Some(FieldValue::Float(None))
        | Some(FieldValue::Character(None)) => Err(PassError::Schema(format!(
            "field {} is null in {}",
            field,
            path.display()
        ))),
        Some(other) => Err(PassError::Schema(format!(
            "field {} has unsupported type {:?} in {}",
            field,
            other,
            path.display()
        ))),
        None => Err(PassError::Schema(format!(
            "field {} missing from a record in {}",
            field,
            path.display()
        ))),
    }
}

fn to_geometry(shape: Shape, path: &Path) -> PassResult<Geometry<f64>> {
    Geometry::<f64>::try_from(shape).map_err(|e| {
        PassError::Processing(format!(
            "unsupported shape in {}: {}",
            path.display(),
            e
        ))
    })
}
