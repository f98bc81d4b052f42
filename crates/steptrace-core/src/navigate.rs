//! Step navigation and axis ticks.
//!
//! The cursor stores only an index and a follow flag. The stream length is
//! passed in on every call, so the cursor stays valid across ingests
//! without holding a borrow of the stream.

use steptrace_types::Snapshot;

use crate::nearest::nearest;

/// Selected position within a step stream.
///
/// A following cursor always resolves to the newest snapshot, so it keeps
/// up as batches arrive. Stepping backward, jumping to the start or
/// scrubbing away from the tail stops following; returning to the tail
/// resumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCursor {
    index: usize,
    follow_latest: bool,
}

impl Default for StepCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl StepCursor {
    /// A cursor following the newest snapshot.
    pub const fn new() -> Self {
        Self {
            index: 0,
            follow_latest: true,
        }
    }

    /// Whether the cursor tracks the newest snapshot.
    pub const fn is_following(&self) -> bool {
        self.follow_latest
    }

    /// Resolved index in a stream of `len` snapshots.
    pub fn position(&self, len: usize) -> Option<usize> {
        let last = len.checked_sub(1)?;
        if self.follow_latest {
            Some(last)
        } else {
            Some(self.index.min(last))
        }
    }

    /// Whether the cursor sits on the newest snapshot, meaning the caller
    /// should ask the simulator for more steps. An empty stream counts as
    /// caught up.
    pub fn is_caught_up(&self, len: usize) -> bool {
        self.position(len)
            .is_none_or(|index| index.saturating_add(1) == len)
    }

    /// Move by `delta` steps, clamped into the stream.
    pub fn step_by(&mut self, delta: i64, len: usize) {
        let Some(current) = self.position(len) else {
            return;
        };
        let magnitude = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
        let target = if delta < 0 {
            current.saturating_sub(magnitude)
        } else {
            current.saturating_add(magnitude)
        };
        self.settle(target, len);
    }

    /// Select the oldest snapshot.
    pub fn jump_to_start(&mut self, len: usize) {
        self.settle(0, len);
    }

    /// Select the newest snapshot and resume following.
    pub const fn jump_to_end(&mut self) {
        self.follow_latest = true;
    }

    /// Select the snapshot closest to `clock`.
    pub fn scrub_to(&mut self, steps: &[Snapshot], clock: u64) {
        if let Some(index) = nearest(steps, clock) {
            self.settle(index, steps.len());
        }
    }

    fn settle(&mut self, target: usize, len: usize) {
        let Some(last) = len.checked_sub(1) else {
            return;
        };
        self.index = target.min(last);
        self.follow_latest = self.index == last;
    }
}

/// Up to `count` evenly spaced clocks for axis labels.
///
/// Every clock when the stream is no longer than `count`; otherwise
/// `count - 1` samples at `floor(len * i / (count - 1))` followed by the
/// newest clock.
pub fn tick_values(steps: &[Snapshot], count: usize) -> Vec<u64> {
    let Some(latest) = steps.last() else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }
    if steps.len() <= count {
        return steps.iter().map(|s| s.clock).collect();
    }

    let intervals = count.saturating_sub(1);
    let mut ticks: Vec<u64> = (0..intervals)
        .filter_map(|i| steps.len().saturating_mul(i).checked_div(intervals))
        .filter_map(|index| steps.get(index))
        .map(|s| s.clock)
        .collect();
    ticks.push(latest.clock);
    ticks
}
