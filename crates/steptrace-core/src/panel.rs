//! Rate panel derivation: window, bucket, smooth.

use serde::Deserialize;
use steptrace_types::{Bucket, RateSeries, Snapshot, ValueDomain};

use crate::bucket::bucket;
use crate::config::RatePanelConfig;
use crate::smooth::rolling_average;
use crate::window::extract_trailing;

/// Per-snapshot quantity charted by a rate panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Fault events attributed to the step.
    Faults,
    /// `1` while an owner is active, `0` when idle.
    Busy,
    /// Fraction of resource slots held by some occupant.
    OccupiedSlots,
    /// The step's attributed duration in milliseconds.
    Duration,
}

impl Metric {
    /// Extract this metric from one snapshot.
    #[allow(clippy::cast_precision_loss)]
    pub fn value_of(self, snapshot: &Snapshot) -> f64 {
        match self {
            Self::Faults => snapshot.fault_count as f64,
            Self::Busy => {
                if snapshot.is_idle() {
                    0.0
                } else {
                    1.0
                }
            }
            Self::OccupiedSlots => {
                let total = snapshot.resource_slots.len();
                if total == 0 {
                    0.0
                } else {
                    snapshot.occupied_slots() as f64 / total as f64
                }
            }
            Self::Duration => snapshot.effective_duration(),
        }
    }
}

/// Derive one rate panel from the clock-sorted `steps`.
///
/// Takes the trailing `window_ms` of the stream, buckets it, then applies
/// the rolling average when configured. Bucket timestamps are shifted by
/// the window's first clock so points share the stream's time axis. An
/// empty stream yields a panel without points.
pub fn derive_rate_series(steps: &[Snapshot], panel: &RatePanelConfig) -> RateSeries {
    let window = extract_trailing(steps, panel.window_ms);

    let points = window.first().map_or_else(Vec::new, |first| {
        #[allow(clippy::cast_precision_loss)]
        let origin = first.clock as f64;
        let metric = panel.metric;
        let combine = panel.combine;

        let buckets = bucket(
            window,
            panel.bucket_width_ms,
            |s| metric.value_of(s),
            |parts| combine.apply(parts),
        );
        let shifted: Vec<(f64, f64)> = buckets
            .iter()
            .map(|b| {
                let (timestamp, value) = b.as_pair();
                (timestamp + origin, value)
            })
            .collect();

        match panel.smoothing_window {
            Some(width) => rolling_average(&shifted, width),
            None => shifted,
        }
        .into_iter()
        .map(Bucket::from)
        .collect()
    });

    let domain = ValueDomain::spanning(points.iter().map(|b| b.timestamp));
    let range = if panel.absolute {
        ValueDomain::spanning(points.iter().map(|b| b.value))
    } else {
        None
    };

    RateSeries {
        name: panel.name.clone(),
        points,
        domain,
        range,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::bucket::Combine;

    const EPS: f64 = 1e-9;

    #[test]
    fn metric_values() {
        let s = Snapshot::new(0)
            .with_faults(3)
            .with_owner(7)
            .with_slots(&[1, 0, 2, 0])
            .with_duration(12.5);
        assert_eq!(Metric::Faults.value_of(&s), 3.0);
        assert_eq!(Metric::Busy.value_of(&s), 1.0);
        assert_eq!(Metric::OccupiedSlots.value_of(&s), 0.5);
        assert_eq!(Metric::Duration.value_of(&s), 12.5);

        let idle = Snapshot::new(0);
        assert_eq!(Metric::Busy.value_of(&idle), 0.0);
        assert_eq!(Metric::OccupiedSlots.value_of(&idle), 0.0);
    }

    #[test]
    fn empty_stream_has_no_points() {
        let series = derive_rate_series(&[], &RatePanelConfig::new("faults", Metric::Faults));
        assert_eq!(series.name, "faults");
        assert!(series.points.is_empty());
        assert_eq!(series.domain, None);
        assert_eq!(series.range, None);
    }

    #[test]
    fn points_are_shifted_onto_stream_clock() {
        let steps: Vec<Snapshot> = (0..4)
            .map(|i| {
                Snapshot::new(1_000 + i * 50)
                    .with_duration(50.0)
                    .with_faults(2)
            })
            .collect();
        let panel = RatePanelConfig {
            absolute: true,
            ..RatePanelConfig::new("faults", Metric::Faults)
        };
        let series = derive_rate_series(&steps, &panel);

        // 200ms of data in 100ms buckets: sentinel plus two full buckets.
        let times: Vec<f64> = series.points.iter().map(|b| b.timestamp).collect();
        assert_eq!(times, vec![1_000.0, 1_100.0, 1_200.0]);
        assert!((series.points[1].value - 4.0).abs() < EPS);

        let domain = series.domain.unwrap();
        assert_eq!((domain.min, domain.max), (1_000.0, 1_200.0));
        let range = series.range.unwrap();
        assert_eq!((range.min, range.max), (0.0, 4.0));
    }

    #[test]
    fn window_limits_the_bucketed_steps() {
        let steps: Vec<Snapshot> = (0..10)
            .map(|i| Snapshot::new(i * 100).with_duration(100.0).with_faults(1))
            .collect();
        let panel = RatePanelConfig {
            window_ms: 300,
            ..RatePanelConfig::new("faults", Metric::Faults)
        };
        let series = derive_rate_series(&steps, &panel);
        // Clocks 600..=900 fall inside the window.
        assert_eq!(series.points.first().unwrap().timestamp, 600.0);
        let total: f64 = series.points.iter().map(|b| b.value).sum();
        assert!((total - 4.0).abs() < EPS);
    }

    #[test]
    fn smoothing_drops_trailing_window() {
        let steps: Vec<Snapshot> = (0..10)
            .map(|i| Snapshot::new(i * 100).with_duration(100.0).with_owner(1))
            .collect();
        let raw = RatePanelConfig {
            combine: Combine::Mean,
            ..RatePanelConfig::new("busy", Metric::Busy)
        };
        let smoothed = RatePanelConfig {
            smoothing_window: Some(3),
            ..raw.clone()
        };
        let raw_len = derive_rate_series(&steps, &raw).points.len();
        let series = derive_rate_series(&steps, &smoothed);
        assert_eq!(series.points.len(), raw_len - 3);
        assert_eq!(series.range, None);
    }
}
