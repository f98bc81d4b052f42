//! Rolling-average smoothing over `(time, value)` series.

/// Sliding mean with stride 1 over `points`.
///
/// Emits one `(mean time, mean value)` pair for each start position
/// `i in 0 .. len - window`. The final window position is not emitted, so
/// the output holds `max(0, len - window)` points and ends before the
/// input does. Returns an empty series when `window` is zero or larger
/// than the input.
pub fn rolling_average(points: &[(f64, f64)], window: usize) -> Vec<(f64, f64)> {
    if window == 0 || points.len() < window {
        return Vec::new();
    }

    #[allow(clippy::cast_precision_loss)]
    let width = window as f64;

    points
        .windows(window)
        .take(points.len().saturating_sub(window))
        .map(|run| {
            let (time, value) = run
                .iter()
                .fold((0.0, 0.0), |(t, v), &(pt, pv)| (t + pt, v + pv));
            (time / width, value / width)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn ramp(n: u32) -> Vec<(f64, f64)> {
        (0..n).map(|i| (f64::from(i) * 10.0, f64::from(i))).collect()
    }

    #[test]
    fn short_input_is_empty() {
        assert!(rolling_average(&ramp(2), 3).is_empty());
        assert!(rolling_average(&[], 1).is_empty());
    }

    #[test]
    fn zero_window_is_empty() {
        assert!(rolling_average(&ramp(5), 0).is_empty());
    }

    #[test]
    fn length_law() {
        for n in 0..12 {
            let points = ramp(n);
            for w in 1..8 {
                let expected = points.len().saturating_sub(w);
                assert_eq!(rolling_average(&points, w).len(), expected, "n={n} w={w}");
            }
        }
    }

    #[test]
    fn means_time_and_value() {
        let out = rolling_average(&ramp(5), 2);
        assert_eq!(out.len(), 3);
        assert!((out[0].0 - 5.0).abs() < EPS);
        assert!((out[0].1 - 0.5).abs() < EPS);
        assert!((out[2].0 - 25.0).abs() < EPS);
        assert!((out[2].1 - 2.5).abs() < EPS);
    }

    /// The final full window (points 3 and 4 here) is deliberately not
    /// emitted. This pins the documented behavior rather than treating it
    /// as an off-by-one to be fixed.
    #[test]
    fn trailing_window_is_dropped() {
        let out = rolling_average(&ramp(5), 2);
        assert!(out.iter().all(|&(t, _)| (t - 35.0).abs() > EPS));
        assert_eq!(rolling_average(&ramp(3), 3), Vec::new());
    }
}
