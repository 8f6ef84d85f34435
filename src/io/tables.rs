use crate::types::{
    ModelSeries, OverlayCount, OverlayRecord, PassResult, ResampledRecord, SeriesRow,
};
use log::info;
use std::path::Path;

/// Write an overlay table as CSV with a `reach_id,overlay_time` header.
/// The header is written even when the table is empty.
pub fn write_overlay_csv<P: AsRef<Path>>(path: P, records: &[OverlayRecord]) -> PassResult<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(["reach_id", "overlay_time"])?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("Wrote {} overlay records to {}", records.len(), path.display());
    Ok(())
}

/// Read an overlay table written by [`write_overlay_csv`]. Records are
/// returned sorted ascending by overlay time regardless of file order,
/// ties kept in file order.
pub fn read_overlay_csv<P: AsRef<Path>>(path: P) -> PassResult<Vec<OverlayRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: OverlayRecord = result?;
        records.push(record);
    }
    records.sort_by(|a, b| a.overlay_time.total_cmp(&b.overlay_time));
    info!("Read {} overlay records from {}", records.len(), path.display());
    Ok(records)
}

/// Write per-reach overlay counts as CSV with a `reach_id,overlays` header.
pub fn write_overlay_counts_csv<P: AsRef<Path>>(
    path: P,
    counts: &[OverlayCount],
) -> PassResult<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(["reach_id", "overlays"])?;
    for count in counts {
        writer.serialize(count)?;
    }
    writer.flush()?;
    info!("Wrote {} overlay counts to {}", counts.len(), path.display());
    Ok(())
}

/// Write resampled discharge records as CSV.
pub fn write_resampled_csv<P: AsRef<Path>>(
    path: P,
    records: &[ResampledRecord],
) -> PassResult<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record([
        "reach_id",
        "overlay_time",
        "matched_time_step",
        "time_delta",
        "discharge",
    ])?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("Wrote {} resampled records to {}", records.len(), path.display());
    Ok(())
}

/// Read a discharge series from CSV rows with a
/// `reach_id,time_step,discharge` header.
pub fn read_series_csv<P: AsRef<Path>>(path: P) -> PassResult<ModelSeries> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: SeriesRow = result?;
        rows.push(row);
    }
    info!("Read {} series rows from {}", rows.len(), path.display());
    Ok(ModelSeries::new(rows))
}
