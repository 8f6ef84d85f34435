use geo::Intersects;
use geo_types::{line_string, polygon, Geometry};
use riverpass::core::{
    extend_cycles, IndexSide, OverlayEngine, OverlayOptions, OverlayPredicate,
};
use riverpass::types::{OverlayRecord, ReachFeature, SwathFeature};

fn square(min: f64, max: f64) -> Geometry<f64> {
    Geometry::Polygon(polygon![
        (x: min, y: min),
        (x: max, y: min),
        (x: max, y: max),
        (x: min, y: max),
        (x: min, y: min),
    ])
}

fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry<f64> {
    Geometry::LineString(line_string![(x: x0, y: y0), (x: x1, y: y1)])
}

fn sorted(mut records: Vec<OverlayRecord>) -> Vec<OverlayRecord> {
    records.sort_by(|a, b| {
        a.overlay_time
            .total_cmp(&b.overlay_time)
            .then(a.reach_id.cmp(&b.reach_id))
    });
    records
}

/// Reference implementation: check every pair directly, no index.
fn brute_force(
    reaches: &[ReachFeature],
    swaths: &[SwathFeature],
    predicate: OverlayPredicate,
) -> Vec<OverlayRecord> {
    let mut records = Vec::new();
    for swath in swaths {
        for reach in reaches {
            if predicate.holds(&swath.shape, &reach.shape) {
                records.push(OverlayRecord {
                    reach_id: reach.id,
                    overlay_time: swath.mean_time,
                });
            }
        }
    }
    records
}

fn xorshift(seed: &mut u64) -> f64 {
    *seed ^= *seed << 13;
    *seed ^= *seed >> 7;
    *seed ^= *seed << 17;
    (*seed % 10_000) as f64 / 100.0
}

#[test]
fn test_single_swath_overlay() {
    let reaches = vec![
        ReachFeature::new(101, line(1.0, 1.0, 2.0, 2.0)),
        ReachFeature::new(102, line(8.0, 8.0, 12.0, 12.0)),
        ReachFeature::new(103, line(3.0, 3.0, 4.0, 4.0)),
    ];
    let swaths = vec![SwathFeature::new(5000.0, square(0.0, 10.0))];

    // Intersects accepts the crossing reach, contains rejects it.
    let records = OverlayEngine::new(OverlayPredicate::Intersects).overlay(&reaches, &swaths);
    assert_eq!(
        sorted(records),
        vec![
            OverlayRecord { reach_id: 101, overlay_time: 5000.0 },
            OverlayRecord { reach_id: 102, overlay_time: 5000.0 },
            OverlayRecord { reach_id: 103, overlay_time: 5000.0 },
        ]
    );

    let records = OverlayEngine::new(OverlayPredicate::Contains).overlay(&reaches, &swaths);
    assert_eq!(
        sorted(records),
        vec![
            OverlayRecord { reach_id: 101, overlay_time: 5000.0 },
            OverlayRecord { reach_id: 103, overlay_time: 5000.0 },
        ]
    );
}

#[test]
fn test_overlay_then_cycle_extension() {
    let reaches = vec![
        ReachFeature::new(101, line(1.0, 1.0, 2.0, 2.0)),
        ReachFeature::new(103, line(3.0, 3.0, 4.0, 4.0)),
    ];
    let swaths = vec![SwathFeature::new(5000.0, square(0.0, 10.0))];

    let base = OverlayEngine::new(OverlayPredicate::Contains).overlay(&reaches, &swaths);
    assert_eq!(base.len(), 2);

    let extended = extend_cycles(&base, 1000.0, 3);
    assert_eq!(extended.len(), 6);
    assert_eq!(
        sorted(extended),
        vec![
            OverlayRecord { reach_id: 101, overlay_time: 5000.0 },
            OverlayRecord { reach_id: 103, overlay_time: 5000.0 },
            OverlayRecord { reach_id: 101, overlay_time: 6000.0 },
            OverlayRecord { reach_id: 103, overlay_time: 6000.0 },
            OverlayRecord { reach_id: 101, overlay_time: 7000.0 },
            OverlayRecord { reach_id: 103, overlay_time: 7000.0 },
        ]
    );
}

#[test]
fn test_multiple_swaths_repeat_reaches() {
    // One reach sits under two footprints and must appear once per pass.
    let reaches = vec![
        ReachFeature::new(1, line(4.0, 4.0, 5.0, 5.0)),
        ReachFeature::new(2, line(40.0, 40.0, 41.0, 41.0)),
    ];
    let swaths = vec![
        SwathFeature::new(200.0, square(0.0, 10.0)),
        SwathFeature::new(100.0, square(3.0, 12.0)),
    ];

    let records = OverlayEngine::new(OverlayPredicate::Contains).overlay(&reaches, &swaths);
    assert_eq!(
        records,
        vec![
            OverlayRecord { reach_id: 1, overlay_time: 100.0 },
            OverlayRecord { reach_id: 1, overlay_time: 200.0 },
        ]
    );
}

#[test]
fn test_engine_matches_brute_force() {
    // Jittered random layout, checked pair-by-pair against the direct
    // all-pairs scan for both predicates and both index sides.
    let mut seed: u64 = 0x2545f4914f6cdd1d;
    let mut reaches = Vec::new();
    for i in 0..40 {
        let x = xorshift(&mut seed);
        let y = xorshift(&mut seed);
        let dx = xorshift(&mut seed) * 0.05;
        let dy = xorshift(&mut seed) * 0.05;
        reaches.push(ReachFeature::new(i % 7, line(x, y, x + dx, y + dy)));
    }
    let mut swaths = Vec::new();
    for i in 0..15 {
        let x = xorshift(&mut seed);
        let y = xorshift(&mut seed);
        let w = 2.0 + xorshift(&mut seed) * 0.1;
        swaths.push(SwathFeature::new(i as f64 * 50.0, square_at(x, y, w)));
    }

    for predicate in [OverlayPredicate::Intersects, OverlayPredicate::Contains] {
        let expected = sorted(brute_force(&reaches, &swaths, predicate));
        for index_side in [IndexSide::Reaches, IndexSide::Swaths] {
            let engine = OverlayEngine::with_options(OverlayOptions {
                predicate,
                index_side,
                exclude_self: false,
            });
            let got = sorted(engine.overlay(&reaches, &swaths));
            assert_eq!(got, expected, "{} via {}", predicate, index_side);
        }
    }

    // Containment implies intersection, so the contains table must be a
    // subset of the intersects table.
    let contains = brute_force(&reaches, &swaths, OverlayPredicate::Contains);
    let intersects = brute_force(&reaches, &swaths, OverlayPredicate::Intersects);
    for record in &contains {
        assert!(intersects.contains(record));
    }
}

fn square_at(x: f64, y: f64, width: f64) -> Geometry<f64> {
    Geometry::Polygon(polygon![
        (x: x, y: y),
        (x: x + width, y: y),
        (x: x + width, y: y + width),
        (x: x, y: y + width),
        (x: x, y: y),
    ])
}

#[test]
fn test_candidate_filtering_never_drops_true_pairs() {
    // A reach whose envelope only grazes the swath corner still counts for
    // intersects when the geometries truly touch.
    let reaches = vec![ReachFeature::new(1, line(10.0, 10.0, 12.0, 12.0))];
    let swaths = vec![SwathFeature::new(1.0, square(0.0, 10.0))];

    assert!(reaches[0].shape.intersects(&swaths[0].shape));
    let records = OverlayEngine::new(OverlayPredicate::Intersects).overlay(&reaches, &swaths);
    assert_eq!(records.len(), 1);
}

#[test]
fn test_output_sorted_by_time_with_stable_ties() {
    let reaches = vec![
        ReachFeature::new(5, line(1.0, 1.0, 2.0, 2.0)),
        ReachFeature::new(3, line(2.0, 2.0, 3.0, 3.0)),
    ];
    let swaths = vec![
        SwathFeature::new(9.0, square(0.0, 10.0)),
        SwathFeature::new(4.0, square(0.0, 10.0)),
    ];

    let records = OverlayEngine::new(OverlayPredicate::Contains).overlay(&reaches, &swaths);
    let times: Vec<f64> = records.iter().map(|r| r.overlay_time).collect();
    assert_eq!(times, vec![4.0, 4.0, 9.0, 9.0]);
    // Ties keep reach load order.
    assert_eq!(records[0].reach_id, 5);
    assert_eq!(records[1].reach_id, 3);
}

#[test]
fn test_self_overlay_exclusion() {
    let shapes = [square(0.0, 1.0), square(5.0, 6.0), square(10.0, 11.0)];
    let reaches: Vec<ReachFeature> = shapes
        .iter()
        .enumerate()
        .map(|(i, s)| ReachFeature::new(i as i64, s.clone()))
        .collect();
    let swaths: Vec<SwathFeature> = shapes
        .iter()
        .enumerate()
        .map(|(i, s)| SwathFeature::new(i as f64 * 10.0, s.clone()))
        .collect();

    let options = OverlayOptions {
        predicate: OverlayPredicate::Intersects,
        index_side: IndexSide::Reaches,
        exclude_self: true,
    };
    assert!(OverlayEngine::with_options(options).overlay(&reaches, &swaths).is_empty());

    let options = OverlayOptions { exclude_self: false, ..options };
    assert_eq!(
        OverlayEngine::with_options(options).overlay(&reaches, &swaths).len(),
        3
    );
}

#[test]
fn test_empty_collections() {
    let engine = OverlayEngine::default();
    assert!(engine.overlay(&[], &[]).is_empty());

    let reaches = vec![ReachFeature::new(1, line(0.0, 0.0, 1.0, 1.0))];
    assert!(engine.overlay(&reaches, &[]).is_empty());

    let swaths = vec![SwathFeature::new(0.0, square(0.0, 1.0))];
    assert!(engine.overlay(&[], &swaths).is_empty());
}
