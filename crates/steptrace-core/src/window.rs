//! Trailing time-window extraction.

use steptrace_types::Snapshot;

/// Return the maximal suffix of `steps` whose first element is at most
/// `window_ms` older than the newest one.
///
/// Scans backward from the tail: callers always want the freshest data and
/// windows are small relative to the stream, so no cursor is kept between
/// calls. An empty input yields an empty slice; a non-empty input always
/// yields at least its last element.
pub fn extract_trailing(steps: &[Snapshot], window_ms: u64) -> &[Snapshot] {
    let Some(latest) = steps.last() else {
        return &[];
    };

    let start = steps
        .iter()
        .rposition(|s| latest.clock.saturating_sub(s.clock) > window_ms)
        .map_or(0, |outside| outside.saturating_add(1));

    steps.get(start..).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn stream(clocks: &[u64]) -> Vec<Snapshot> {
        clocks.iter().copied().map(Snapshot::new).collect()
    }

    fn clocks(steps: &[Snapshot]) -> Vec<u64> {
        steps.iter().map(|s| s.clock).collect()
    }

    #[test]
    fn empty_stream_yields_empty() {
        assert!(extract_trailing(&[], 100).is_empty());
    }

    #[test]
    fn single_element_is_returned() {
        let steps = stream(&[42]);
        assert_eq!(clocks(extract_trailing(&steps, 0)), vec![42]);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let steps = stream(&[0, 100, 250]);
        assert_eq!(clocks(extract_trailing(&steps, 150)), vec![100, 250]);
        assert_eq!(clocks(extract_trailing(&steps, 250)), vec![0, 100, 250]);
        assert_eq!(clocks(extract_trailing(&steps, 149)), vec![250]);
    }

    #[test]
    fn zero_window_keeps_only_latest_clock() {
        let steps = stream(&[5, 10, 10]);
        assert_eq!(clocks(extract_trailing(&steps, 0)), vec![10, 10]);
    }

    #[test]
    fn result_is_contained_contiguous_suffix() {
        let steps = stream(&[0, 3, 7, 20, 21, 40, 41, 41, 90, 95]);
        for window in [1, 5, 10, 50, 100, 1000] {
            let tail = extract_trailing(&steps, window);
            assert!(!tail.is_empty());
            let offset = steps.len() - tail.len();
            assert_eq!(tail, &steps[offset..]);
            assert!(tail.iter().all(|s| 95 - s.clock <= window));
            if offset > 0 {
                assert!(95 - steps[offset - 1].clock > window);
            }
        }
    }
}
