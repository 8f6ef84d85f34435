use crate::types::OverlayRecord;
use log::info;

/// SWOT orbit repeat cycle, in seconds (20.86 days).
pub const SWOT_CYCLE_SECONDS: f64 = 1_802_700.0;

/// Replicate overlay records across orbit repeat cycles.
///
/// Cycle `k` shifts every base record by `k * cycle_period`; the output
/// holds exactly `base.len() * cycle_count` records sorted ascending by
/// time, equal times kept in cycle-then-base order. Records are replicated
/// as-is even when shifted copies collide or interleave with base times.
pub fn extend_cycles(
    base: &[OverlayRecord],
    cycle_period: f64,
    cycle_count: usize,
) -> Vec<OverlayRecord> {
    let mut extended = Vec::with_capacity(base.len() * cycle_count);
    for cycle in 0..cycle_count {
        let shift = cycle as f64 * cycle_period;
        for record in base {
            extended.push(OverlayRecord {
                reach_id: record.reach_id,
                overlay_time: record.overlay_time + shift,
            });
        }
    }

    extended.sort_by(|a, b| a.overlay_time.total_cmp(&b.overlay_time));
    info!(
        "Extended {} overlay records across {} cycles of {} s: {} records",
        base.len(),
        cycle_count,
        cycle_period,
        extended.len()
    );
    extended
}

/// Number of whole cycles needed to cover a model time span. Always at
/// least one so the base records survive even when the span is shorter
/// than a single cycle.
pub fn cycles_to_cover(span_seconds: f64, cycle_period: f64) -> usize {
    if cycle_period <= 0.0 {
        return 1;
    }
    ((span_seconds / cycle_period).ceil() as usize).max(1)
}
