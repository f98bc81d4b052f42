//! Integration tests for the `steptrace-core` pipeline.
//!
//! Drives feed lines through a [`Session`] and checks the derived panels
//! against the standalone derivation functions.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use steptrace_core::bucket::{Combine, bucket};
use steptrace_core::config::{InspectorConfig, RatePanelConfig};
use steptrace_core::feed::parse_batch;
use steptrace_core::occupancy::compress;
use steptrace_core::panel::{Metric, derive_rate_series};
use steptrace_core::session::Session;
use steptrace_core::window::extract_trailing;
use steptrace_types::{Bucket, Snapshot};

// =============================================================================
// Helpers
// =============================================================================

const FEED: &str = r#"
{"clock": 0, "duration": 150, "ownerId": 1, "resourceSlots": [1, 0], "faultCount": 10}
[{"clock": 200, "duration": 150, "resourceSlots": [2, 0], "faultCount": 10}, {"clock": 100, "duration": 150, "ownerId": 3, "resourceSlots": [1, 4], "faultCount": 10}]

{"clock": 300, "duration": 150, "ownerId": 3, "resourceSlots": [2, null], "faultCount": 10, "label": "tail"}
"#;

fn feed_session(config: InspectorConfig) -> Session {
    let mut session = Session::new(config);
    for (i, line) in FEED.lines().enumerate() {
        let batch = parse_batch(line, i + 1).expect("feed line should decode");
        if !batch.is_empty() {
            session.apply_batch(batch);
        }
    }
    session
}

fn sum(parts: &[f64]) -> f64 {
    Combine::Sum.apply(parts)
}

// =============================================================================
// Feed to frame
// =============================================================================

#[test]
fn feed_lines_build_a_sorted_session() {
    let session = feed_session(InspectorConfig::default());
    let frame = session.frame();

    assert_eq!(frame.step_count, 4);
    assert_eq!(frame.latest_clock, Some(300));
    assert_eq!(frame.total_faults, 40);
    let clocks: Vec<u64> = session.stream().as_slice().iter().map(|s| s.clock).collect();
    assert_eq!(clocks, vec![0, 100, 200, 300]);

    let current = frame.current.unwrap();
    assert_eq!(current.extra.get("label").unwrap(), "tail");
}

#[test]
fn frame_serializes_for_the_dashboard() {
    let frame = feed_session(InspectorConfig::default()).frame();
    let json = serde_json::to_value(&frame).unwrap();
    assert_eq!(json["step_count"], 4);
    assert_eq!(json["current"]["label"], "tail");
    assert!(json["rates"].as_array().unwrap().len() == 3);
    assert!(json["timeline"]["blocks"].is_array());
}

#[test]
fn timeline_blocks_cover_every_slot() {
    let frame = feed_session(InspectorConfig::default()).frame();
    let timeline = frame.timeline.unwrap();
    assert_eq!(timeline.slot_count, 2);
    for slot in 0..2 {
        let runs: Vec<_> = timeline.blocks.iter().filter(|b| b.slot == slot).collect();
        assert_eq!(runs.first().unwrap().start, 0);
        assert_eq!(runs.last().unwrap().end, 300);
        assert!(runs.windows(2).all(|w| w[0].end == w[1].start));
    }
}

#[test]
fn owner_runs_follow_the_feed() {
    let frame = feed_session(InspectorConfig::default()).frame();
    let runs = frame.timeline.unwrap().owner_runs;
    let summary: Vec<(Option<u32>, f64, f64)> =
        runs.iter().map(|r| (r.owner, r.start, r.end)).collect();
    assert_eq!(
        summary,
        vec![
            (Some(1), -150.0, 0.0),
            (Some(3), -50.0, 100.0),
            (None, 50.0, 200.0),
            (Some(3), 150.0, 300.0),
        ]
    );
}

#[test]
fn rate_panels_match_standalone_derivation() {
    let panel = RatePanelConfig {
        window_ms: 250,
        absolute: true,
        ..RatePanelConfig::new("faults", Metric::Faults)
    };
    let mut config = InspectorConfig::default();
    config.panels.rates = vec![panel.clone()];

    let session = feed_session(config);
    let frame = session.frame();
    assert_eq!(frame.rates.len(), 1);
    assert_eq!(
        frame.rates[0],
        derive_rate_series(session.stream().as_slice(), &panel)
    );

    // Window of 250ms back from 300 keeps clocks 100, 200 and 300.
    let window = extract_trailing(session.stream().as_slice(), 250);
    assert_eq!(window.len(), 3);
    assert_eq!(frame.rates[0].points[0].timestamp, 100.0);
}

// =============================================================================
// Documented scenarios
// =============================================================================

#[test]
fn straddling_snapshot_scenario() {
    let steps = vec![Snapshot::new(0).with_duration(150.0).with_faults(10)];
    let out = bucket(&steps, 100.0, |s| s.fault_count as f64, sum);
    assert_eq!(out[0], Bucket::SENTINEL);
    assert_eq!(out[1].timestamp, 100.0);
    assert!((out[1].value - 6.666_666_666).abs() < 1e-6);
}

#[test]
fn constant_rate_conserves_total() {
    let steps: Vec<Snapshot> = (0..10)
        .map(|i| Snapshot::new(i * 150).with_duration(150.0).with_faults(10))
        .collect();
    let out = bucket(&steps, 100.0, |s| s.fault_count as f64, sum);
    // The final bucket is exactly full, so its re-normalized value is its
    // raw mass and the series sums to the input total.
    let total: f64 = out.iter().map(|b| b.value).sum();
    assert!((total - 100.0).abs() < 1e-6);
}

#[test]
fn single_slot_compression_scenario() {
    let steps = vec![
        Snapshot::new(0).with_slots(&[1]),
        Snapshot::new(10).with_slots(&[1]),
        Snapshot::new(20).with_slots(&[2]),
    ];
    let blocks = compress(&steps);
    let summary: Vec<(u64, u64, u64)> = blocks
        .iter()
        .map(|b| (b.occupant.0, b.start, b.end))
        .collect();
    assert_eq!(summary, vec![(1, 0, 10), (2, 10, 20)]);
}

// =============================================================================
// Randomized batches
// =============================================================================

#[test]
fn incremental_session_matches_full_recomputation() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut session = Session::new(InspectorConfig::default());

    for _ in 0..40 {
        let size = rng.random_range(1..6);
        let mut batch: Vec<Snapshot> = (0..size)
            .map(|_| {
                let a = rng.random_range(0..4);
                let b = rng.random_range(0..4);
                Snapshot::new(rng.random_range(0..2_000))
                    .with_duration(rng.random_range(0.0..120.0))
                    .with_faults(rng.random_range(0..3))
                    .with_slots(&[a, b, 7])
            })
            .collect();
        batch.shuffle(&mut rng);

        let frame = session.apply_batch(batch);
        let steps = session.stream().as_slice();

        assert!(steps.windows(2).all(|w| w[0].clock <= w[1].clock));
        assert_eq!(frame.timeline.unwrap().blocks, compress(steps));
        let faults: u64 = steps.iter().map(|s| s.fault_count).sum();
        assert_eq!(frame.total_faults, faults);
    }
}
