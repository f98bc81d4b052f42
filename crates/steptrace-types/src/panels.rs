//! Render-ready outputs consumed by the dashboard panels.
//!
//! Everything here is produced fresh by the engine's derivation functions;
//! none of it is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::SessionId;
use crate::snapshot::{SlotOccupant, Snapshot};

/// One fixed-width time interval's aggregated value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Bucket {
    /// Start-of-series-relative time of the bucket (milliseconds).
    pub timestamp: f64,
    /// Aggregated value for the bucket.
    pub value: f64,
}

impl Bucket {
    /// The `(0, 0)` bucket every bucketed series starts with.
    pub const SENTINEL: Self = Self::new(0.0, 0.0);

    /// Create a bucket.
    pub const fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// The bucket as a `(timestamp, value)` pair.
    pub const fn as_pair(self) -> (f64, f64) {
        (self.timestamp, self.value)
    }
}

impl From<(f64, f64)> for Bucket {
    fn from((timestamp, value): (f64, f64)) -> Self {
        Self { timestamp, value }
    }
}

/// Closed numeric interval `[min, max]` used for axis domains and ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ValueDomain {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ValueDomain {
    /// Smallest interval containing every finite value, or `None` when
    /// there are none.
    pub fn spanning(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Self>, v| {
                Some(acc.map_or(Self { min: v, max: v }, |d| Self {
                    min: d.min.min(v),
                    max: d.max.max(v),
                }))
            })
    }
}

/// One contiguous run of a slot being held by the same occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OccupancyBlock {
    /// Slot address.
    pub slot: usize,
    /// Occupant held for the whole run.
    pub occupant: SlotOccupant,
    /// Clock at which the run starts.
    pub start: u64,
    /// Clock of the last observation of the run.
    pub end: u64,
}

/// A run of consecutive steps scheduled for the same owner.
///
/// `owner` is `None` for a run of idle steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OwnerRun {
    /// Owner scheduled for the whole run.
    pub owner: Option<u32>,
    /// Clock at which the run's first step began executing.
    pub start: f64,
    /// Clock of the run's last step.
    pub end: f64,
}

/// A rate/series panel: bucketed, optionally smoothed points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RateSeries {
    /// Panel name from configuration.
    pub name: String,
    /// Points in stream clock units.
    pub points: Vec<Bucket>,
    /// `[min_time, max_time]` of `points`.
    pub domain: Option<ValueDomain>,
    /// `[min_value, max_value]` of `points`, present for absolute-unit
    /// panels only. Relative panels render against `[0, 1]`.
    pub range: Option<ValueDomain>,
}

/// Occupancy timeline panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimelinePanel {
    /// Latest stream clock (the timeline's vertical extent).
    pub clock: u64,
    /// Number of tracked slots.
    pub slot_count: usize,
    /// Blocks for slot 0, then slot 1, and so on, each in temporal order.
    pub blocks: Vec<OccupancyBlock>,
    /// Which owner held the processor over time.
    pub owner_runs: Vec<OwnerRun>,
}

/// Everything the dashboard needs after one applied batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionFrame {
    /// Session the frame belongs to.
    pub session_id: SessionId,
    /// Wall-clock time the session was opened.
    pub session_started_at: DateTime<Utc>,
    /// Number of snapshots in the stream.
    pub step_count: usize,
    /// Clock of the newest snapshot.
    pub latest_clock: Option<u64>,
    /// Stream index of the snapshot currently selected for display.
    pub cursor: Option<usize>,
    /// Whether the cursor sits on the newest snapshot.
    pub caught_up: bool,
    /// Steps to ask the simulator for; present only when `caught_up`.
    pub request_more_steps: Option<u32>,
    /// Fault events across the whole stream.
    pub total_faults: u64,
    /// The snapshot at `cursor`.
    pub current: Option<Snapshot>,
    /// Rate panels in configuration order.
    pub rates: Vec<RateSeries>,
    /// Occupancy timeline, when enabled.
    pub timeline: Option<TimelinePanel>,
    /// Evenly spaced clocks for the scrub axis.
    pub tick_values: Vec<u64>,
}
