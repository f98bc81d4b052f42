//! One dashboard session: the stream plus everything derived from it.
//!
//! A [`Session`] owns its [`StepStream`] exclusively. Batches are applied
//! one at a time; each application ingests, updates the incremental
//! occupancy history, and re-derives every configured rate panel before
//! the next batch is looked at.

use chrono::{DateTime, Utc};
use steptrace_types::{SessionFrame, SessionId, Snapshot, TimelinePanel};
use tracing::{debug, info};

use crate::config::InspectorConfig;
use crate::navigate::{StepCursor, tick_values};
use crate::nearest::clock_at_fraction;
use crate::occupancy::{OccupancyTracker, owner_runs};
use crate::panel::derive_rate_series;
use crate::stream::StepStream;

/// State for one live connection to the simulator.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    started_at: DateTime<Utc>,
    config: InspectorConfig,
    stream: StepStream,
    occupancy: OccupancyTracker,
    cursor: StepCursor,
    total_faults: u64,
}

impl Session {
    /// Open an empty session.
    pub fn new(config: InspectorConfig) -> Self {
        let id = SessionId::new();
        info!(session_id = %id, panels = config.panels.rates.len(), "session opened");
        Self {
            id,
            started_at: Utc::now(),
            config,
            stream: StepStream::new(),
            occupancy: OccupancyTracker::new(),
            cursor: StepCursor::new(),
            total_faults: 0,
        }
    }

    /// Session identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The ordered stream.
    pub const fn stream(&self) -> &StepStream {
        &self.stream
    }

    /// The occupancy history.
    pub const fn occupancy(&self) -> &OccupancyTracker {
        &self.occupancy
    }

    /// Fault events across every ingested snapshot.
    pub const fn total_faults(&self) -> u64 {
        self.total_faults
    }

    /// Ingest `batch` and return the refreshed frame.
    pub fn apply_batch(&mut self, batch: Vec<Snapshot>) -> SessionFrame {
        let batch_faults = batch
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.fault_count));
        let previous_len = self.stream.len();
        let report = self.stream.ingest(batch);
        self.total_faults = self.total_faults.saturating_add(batch_faults);

        if self.config.panels.timeline.enabled {
            self.occupancy
                .sync(self.stream.as_slice(), report.first_changed);
        }

        debug!(
            session_id = %self.id,
            added = report.added,
            rewrote_history = report.rewrote_history(previous_len),
            steps = self.stream.len(),
            total_faults = self.total_faults,
            "batch applied"
        );

        self.frame()
    }

    /// Build the frame for the current state without ingesting anything.
    pub fn frame(&self) -> SessionFrame {
        let steps = self.stream.as_slice();
        let cursor = self.cursor.position(steps.len());
        let caught_up = self.cursor.is_caught_up(steps.len());

        let rates = self
            .config
            .panels
            .rates
            .iter()
            .map(|panel| derive_rate_series(steps, panel))
            .collect();

        let timeline = self.config.panels.timeline.enabled.then(|| TimelinePanel {
            clock: self.stream.latest().map_or(0, |s| s.clock),
            slot_count: self.occupancy.slot_count(),
            blocks: self.occupancy.blocks(),
            owner_runs: owner_runs(steps),
        });

        SessionFrame {
            session_id: self.id,
            session_started_at: self.started_at,
            step_count: steps.len(),
            latest_clock: self.stream.latest().map(|s| s.clock),
            cursor,
            caught_up,
            request_more_steps: caught_up.then_some(self.config.session.request_more_steps),
            total_faults: self.total_faults,
            current: cursor.and_then(|i| self.stream.get(i)).cloned(),
            rates,
            timeline,
            tick_values: tick_values(steps, self.config.session.tick_label_count),
        }
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Move the cursor by `delta` steps.
    pub fn step_by(&mut self, delta: i64) {
        self.cursor.step_by(delta, self.stream.len());
    }

    /// Select the oldest snapshot.
    pub fn jump_to_start(&mut self) {
        self.cursor.jump_to_start(self.stream.len());
    }

    /// Select the newest snapshot and follow new arrivals.
    pub const fn jump_to_end(&mut self) {
        self.cursor.jump_to_end();
    }

    /// Select the snapshot nearest to `clock`.
    pub fn scrub_to(&mut self, clock: u64) {
        self.cursor.scrub_to(self.stream.as_slice(), clock);
    }

    /// Select the snapshot nearest to a horizontal scrub position in
    /// `[0, 1]`.
    pub fn scrub_to_fraction(&mut self, fraction: f64) {
        if let Some(clock) = clock_at_fraction(self.stream.as_slice(), fraction) {
            self.scrub_to(clock);
        }
    }
}
