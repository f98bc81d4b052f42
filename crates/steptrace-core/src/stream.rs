//! Ordered, append-only snapshot history.
//!
//! A [`StepStream`] is owned by exactly one session and is only ever
//! mutated through [`StepStream::ingest`]. After every ingest the stream is
//! sorted non-decreasing by `clock`; snapshots sharing a clock keep their
//! arrival order.

use steptrace_types::Snapshot;
use tracing::debug;

/// Outcome of one [`StepStream::ingest`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Number of snapshots appended.
    pub added: usize,
    /// Lowest stream index whose snapshot may differ from before the
    /// ingest. `None` when nothing was added.
    ///
    /// Equal to the previous length when the batch landed entirely after
    /// the existing tail, which lets incremental consumers extend instead
    /// of rebuilding.
    pub first_changed: Option<usize>,
}

impl IngestReport {
    /// Whether the batch rewrote part of the already-seen history.
    pub const fn rewrote_history(&self, previous_len: usize) -> bool {
        match self.first_changed {
            Some(index) => index < previous_len,
            None => false,
        }
    }
}

/// Ordered sequence of snapshots for one dashboard session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepStream {
    steps: Vec<Snapshot>,
}

impl StepStream {
    /// Create an empty stream.
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append every snapshot in `batch`, then stable-sort the whole stream
    /// by `clock`.
    ///
    /// Batches may arrive slightly out of order (coalesced pushes), so the
    /// full re-sort is always performed. An empty batch is a no-op.
    pub fn ingest(&mut self, batch: Vec<Snapshot>) -> IngestReport {
        let Some(min_clock) = batch.iter().map(|s| s.clock).min() else {
            return IngestReport::default();
        };

        // Stable sort places new snapshots after existing ones with the same
        // clock, so nothing at or before `min_clock` moves.
        let first_changed = self.steps.partition_point(|s| s.clock <= min_clock);
        let added = batch.len();

        self.steps.extend(batch);
        self.steps.sort_by_key(|s| s.clock);

        debug!(
            added,
            first_changed,
            len = self.steps.len(),
            "batch ingested"
        );

        IngestReport {
            added,
            first_changed: Some(first_changed),
        }
    }

    /// The newest snapshot, if any.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.steps.last()
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the stream holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Snapshot at `index`.
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.steps.get(index)
    }

    /// All snapshots in clock order.
    pub fn as_slice(&self) -> &[Snapshot] {
        &self.steps
    }

    /// Clamp `index` into `[0, len - 1]`. `None` on an empty stream.
    pub fn clamp_index(&self, index: usize) -> Option<usize> {
        self.steps.len().checked_sub(1).map(|last| index.min(last))
    }
}

impl AsRef<[Snapshot]> for StepStream {
    fn as_ref(&self) -> &[Snapshot] {
        &self.steps
    }
}
