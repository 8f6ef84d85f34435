use crate::types::{ModelSeries, OverlayRecord, ReachId, ResampledRecord, SeriesRow};
use log::{info, warn};
use std::collections::{HashMap, HashSet};

/// Resampling output: matched records plus how many overlay rows found no
/// discharge value to join against.
#[derive(Debug, Clone, Default)]
pub struct ResampledDischarge {
    pub records: Vec<ResampledRecord>,
    pub dropped_overlays: usize,
}

/// Nearest step to `target` in an ascending `schedule`. Exact hits return
/// the hit; equidistant targets resolve to the earlier step. `None` only
/// for an empty schedule.
pub fn nearest_time_step(schedule: &[f64], target: f64) -> Option<f64> {
    if schedule.is_empty() {
        return None;
    }

    match schedule.binary_search_by(|step| step.total_cmp(&target)) {
        Ok(i) => Some(schedule[i]),
        Err(0) => Some(schedule[0]),
        Err(i) if i == schedule.len() => Some(schedule[i - 1]),
        Err(i) => {
            let lo = schedule[i - 1];
            let hi = schedule[i];
            if target - lo <= hi - target {
                Some(lo)
            } else {
                Some(hi)
            }
        }
    }
}

/// Match every overlay record to its nearest model time step and join the
/// discharge value for that (reach, step) pair.
///
/// The series is first restricted to reaches the overlay table mentions;
/// the schedule is the distinct ascending set of their time steps, and the
/// join map holds only the retained rows. Overlay rows whose (reach,
/// matched step) pair has no series row are dropped and counted, not
/// failed: a reach can appear in the overlay table without appearing in
/// the model output. Input order is preserved, so a time-sorted overlay
/// table yields a time-sorted result.
pub fn match_and_join(extended: &[OverlayRecord], series: &ModelSeries) -> ResampledDischarge {
    let overlay_reaches: HashSet<ReachId> = extended.iter().map(|r| r.reach_id).collect();

    let retained: Vec<&SeriesRow> = series
        .rows
        .iter()
        .filter(|row| overlay_reaches.contains(&row.reach_id))
        .collect();

    let mut schedule: Vec<f64> = retained.iter().map(|row| row.time_step).collect();
    schedule.sort_by(|a, b| a.total_cmp(b));
    schedule.dedup();

    if schedule.is_empty() {
        if !extended.is_empty() {
            warn!(
                "No model time steps for any of the {} overlay records; dropping all",
                extended.len()
            );
        }
        return ResampledDischarge { records: Vec::new(), dropped_overlays: extended.len() };
    }

    let mut discharge_by_key: HashMap<(ReachId, u64), f64> =
        HashMap::with_capacity(retained.len());
    for row in retained {
        discharge_by_key.insert((row.reach_id, row.time_step.to_bits()), row.discharge);
    }

    let mut records = Vec::with_capacity(extended.len());
    let mut dropped_overlays = 0usize;
    for overlay in extended {
        // Schedule is non-empty here, so the match always resolves.
        let Some(matched_time_step) = nearest_time_step(&schedule, overlay.overlay_time) else {
            dropped_overlays += 1;
            continue;
        };
        match discharge_by_key.get(&(overlay.reach_id, matched_time_step.to_bits())) {
            Some(&discharge) => records.push(ResampledRecord {
                reach_id: overlay.reach_id,
                overlay_time: overlay.overlay_time,
                matched_time_step,
                time_delta: (overlay.overlay_time - matched_time_step).abs(),
                discharge,
            }),
            None => dropped_overlays += 1,
        }
    }

    info!(
        "Resampled {} overlay records onto {} model steps: {} matched",
        extended.len(),
        schedule.len(),
        records.len()
    );
    if dropped_overlays > 0 {
        warn!(
            "{} overlay records had no discharge value at their matched step",
            dropped_overlays
        );
    }

    ResampledDischarge { records, dropped_overlays }
}
