//! Fixed-interval bucketing with fractional carry.
//!
//! Snapshots carry irregular, data-dependent durations (variable time
//! slices) but charts need uniform time buckets. Each snapshot's value is
//! spread over the buckets its duration overlaps, in proportion to the
//! overlap, so a boundary-straddling snapshot is neither double counted
//! nor dropped.
//!
//! Two entry points produce identical output:
//!
//! - [`bucket`] recomputes a series from a slice of snapshots.
//! - [`BucketAccumulator`] keeps the carry state between pushes so a
//!   series can be extended one snapshot at a time.

use serde::Deserialize;
use steptrace_types::{Bucket, Snapshot};
use tracing::warn;

/// Built-in reductions for the values assigned to one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// Sum of the parts.
    #[default]
    Sum,
    /// Arithmetic mean of the parts.
    Mean,
    /// Largest part.
    Max,
}

impl Combine {
    /// Reduce `parts` to one value. Every reduction of no parts is `0`.
    pub fn apply(self, parts: &[f64]) -> f64 {
        match self {
            Self::Sum => parts.iter().sum(),
            Self::Mean => {
                if parts.is_empty() {
                    0.0
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let n = parts.len() as f64;
                    parts.iter().sum::<f64>() / n
                }
            }
            Self::Max => parts.iter().copied().reduce(f64::max).unwrap_or(0.0),
        }
    }
}

/// Re-sample `snapshots` into buckets `bucket_width` milliseconds wide.
///
/// `value_of` extracts the per-snapshot quantity and `combine` reduces the
/// parts assigned to one bucket. The output starts with the `(0, 0)`
/// sentinel, continues with one bucket per closed interval stamped at the
/// interval's end, and finishes with a partial bucket re-normalized to a
/// full-bucket rate when any parts remain.
///
/// A non-positive or non-finite `bucket_width` yields only the sentinel.
pub fn bucket<V, C>(snapshots: &[Snapshot], bucket_width: f64, value_of: V, combine: C) -> Vec<Bucket>
where
    V: Fn(&Snapshot) -> f64,
    C: Fn(&[f64]) -> f64,
{
    let mut acc = BucketAccumulator::new(bucket_width, combine);
    for snapshot in snapshots {
        acc.push(snapshot.effective_duration(), value_of(snapshot));
    }
    acc.finish()
}

/// Most buckets a single snapshot may close in one push.
pub const MAX_BUCKETS_PER_SNAPSHOT: u32 = 10_000;

/// Incremental fractional-carry state.
///
/// Holds the closed buckets plus the carry for the bucket being filled.
/// Pushing the same `(duration, value)` sequence always yields the same
/// buckets as [`bucket`] over the same snapshots.
#[derive(Debug, Clone)]
pub struct BucketAccumulator<C> {
    width: f64,
    combine: C,
    /// Time already attributed to the open bucket, in `[0, width]`.
    elapsed: f64,
    /// Parts assigned to the open bucket.
    pending: Vec<f64>,
    /// One-based index of the open bucket.
    index: u32,
    closed: Vec<Bucket>,
}

impl<C> BucketAccumulator<C>
where
    C: Fn(&[f64]) -> f64,
{
    /// Start an empty series.
    pub fn new(bucket_width: f64, combine: C) -> Self {
        if !(bucket_width.is_finite() && bucket_width > 0.0) {
            warn!(bucket_width, "degenerate bucket width, series stays at the sentinel");
        }
        Self {
            width: bucket_width,
            combine,
            elapsed: 0.0,
            pending: Vec::new(),
            index: 1,
            closed: vec![Bucket::SENTINEL],
        }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.width > 0.0)
    }

    /// Attribute `value` spread over `duration` milliseconds to the series.
    ///
    /// Whole buckets covered by the snapshot are closed arithmetically, and
    /// at most [`MAX_BUCKETS_PER_SNAPSHOT`] of them per call. A longer
    /// duration is clamped to that span; its whole value is still
    /// distributed.
    pub fn push(&mut self, duration: f64, value: f64) {
        if self.is_degenerate() {
            return;
        }
        let mut duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        let span_cap = self.width * f64::from(MAX_BUCKETS_PER_SNAPSHOT);
        if duration > span_cap {
            warn!(
                duration,
                bucket_width = self.width,
                cap = MAX_BUCKETS_PER_SNAPSHOT,
                "snapshot spans too many buckets, duration clamped"
            );
            duration = span_cap;
        }

        if self.elapsed + duration <= self.width {
            self.elapsed += duration;
            self.pending.push(value);
            return;
        }

        // duration > width - elapsed >= 0 here, so every division is safe.
        let room = self.width - self.elapsed;
        let head = value * room / duration;
        // A bucket filled exactly by earlier snapshots takes no part.
        if room > 0.0 {
            self.pending.push(head);
        }
        self.close_bucket();

        let tail_duration = duration - room;
        let tail_value = value - head;
        // An exact multiple of the width leaves its last bucket open.
        let whole = ((tail_duration / self.width).ceil() - 1.0)
            .clamp(0.0, f64::from(MAX_BUCKETS_PER_SNAPSHOT));
        let per_bucket = tail_value * self.width / tail_duration;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        for _ in 0..whole as u32 {
            self.pending.push(per_bucket);
            self.close_bucket();
        }

        self.elapsed = (tail_duration - whole * self.width).clamp(0.0, self.width);
        self.pending.push(tail_value - per_bucket * whole);
    }

    fn close_bucket(&mut self) {
        let value = (self.combine)(&self.pending);
        self.closed
            .push(Bucket::new(self.width * f64::from(self.index), value));
        self.index = self.index.saturating_add(1);
        self.pending.clear();
        self.elapsed = 0.0;
    }

    #[cfg(test)]
    fn closed(&self) -> &[Bucket] {
        &self.closed
    }

    #[cfg(test)]
    fn pending_mass(&self) -> f64 {
        self.pending.iter().sum()
    }

    /// The trailing partial bucket, if any parts are pending.
    ///
    /// Stamped at `width * (index - 1 + frac)` with `frac = elapsed / width`
    /// and valued at `combine(pending) / frac`; `0` when no time has
    /// elapsed in the open bucket.
    pub fn partial(&self) -> Option<Bucket> {
        if self.pending.is_empty() || self.is_degenerate() {
            return None;
        }
        let frac = self.elapsed / self.width;
        let timestamp = self.width * (f64::from(self.index) - 1.0 + frac);
        let value = if self.elapsed > 0.0 {
            (self.combine)(&self.pending) / frac
        } else {
            0.0
        };
        Some(Bucket::new(timestamp, value))
    }

    #[cfg(test)]
    fn buckets(&self) -> Vec<Bucket> {
        let mut out = self.closed.clone();
        out.extend(self.partial());
        out
    }

    /// Consume the accumulator and return the full series.
    pub fn finish(mut self) -> Vec<Bucket> {
        let partial = self.partial();
        self.closed.extend(partial);
        self.closed
    }
}
