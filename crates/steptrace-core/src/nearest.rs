//! Nearest-snapshot lookup for scrubbing.

use steptrace_types::Snapshot;

/// Index of the snapshot whose clock is closest to `target`.
///
/// Binary search over the clock-sorted `steps`. An exact match wins
/// outright; otherwise the two neighbours of the insertion point are
/// compared and the earlier one wins a tie. `None` only for an empty slice.
pub fn nearest(steps: &[Snapshot], target: u64) -> Option<usize> {
    let last = steps.len().checked_sub(1)?;
    let insert = steps.partition_point(|s| s.clock < target);

    if steps.get(insert).is_some_and(|s| s.clock == target) {
        return Some(insert);
    }

    let after = insert.min(last);
    let before = insert.saturating_sub(1).min(last);
    let distance = |index: usize| {
        steps
            .get(index)
            .map_or(u64::MAX, |s| s.clock.abs_diff(target))
    };

    if distance(after) < distance(before) {
        Some(after)
    } else {
        Some(before)
    }
}

/// Map a horizontal scrub position to a clock.
///
/// `fraction` is clamped to `[0, 1]` (NaN reads as `0`) and scaled onto
/// `[0, latest.clock]`, rounded to the nearest millisecond.
pub fn clock_at_fraction(steps: &[Snapshot], fraction: f64) -> Option<u64> {
    let latest = steps.last()?.clock;
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let clock = ((latest as f64) * fraction).round() as u64;
    Some(clock.min(latest))
}
