// =============================================================================
// Smoothing primitives — exponential-weighted mean and rolling windows
// =============================================================================
//
// Adjusted exponential-weighted mean with smoothing factor `alpha`:
//
//   y_t = (x_t + (1-a) x_{t-1} + (1-a)^2 x_{t-2} + ... + (1-a)^t x_0)
//         / (1 + (1-a) + (1-a)^2 + ... + (1-a)^t)
//
// Evaluated with the running recurrences
//   num_t = x_t + (1-a) num_{t-1}
//   den_t = 1   + (1-a) den_{t-1}
//
// The first output equals the first input; early observations fade out
// geometrically instead of being cut off by a fixed window.  With
// `alpha = 1 / period` this is Wilder's smoothing.
// =============================================================================

/// Adjusted exponential-weighted mean of `values`, one output per input.
///
/// Returns an empty `Vec` when `values` is empty or `alpha` is outside `(0, 1]`.
pub fn ewm_mean(values: &[f64], alpha: f64) -> Vec<f64> {
    if values.is_empty() || !(alpha > 0.0 && alpha <= 1.0) {
        return Vec::new();
    }

    let decay = 1.0 - alpha;
    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;

    values
        .iter()
        .map(|&x| {
            numerator = x + decay * numerator;
            denominator = 1.0 + decay * denominator;
            numerator / denominator
        })
        .collect()
}

/// Arithmetic mean of `window`, `None` when empty.
pub fn mean(window: &[f64]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    Some(window.iter().sum::<f64>() / window.len() as f64)
}

/// Mean absolute deviation of `window` around its own mean.
pub fn mean_deviation(window: &[f64]) -> Option<f64> {
    let centre = mean(window)?;
    Some(window.iter().map(|x| (x - centre).abs()).sum::<f64>() / window.len() as f64)
}

/// The trailing `period` values ending at (and including) `end`.
///
/// `None` when fewer than `period` values exist up to `end`.
pub fn trailing_window(values: &[f64], end: usize, period: usize) -> Option<&[f64]> {
    if period == 0 || end >= values.len() || end + 1 < period {
        return None;
    }
    Some(&values[end + 1 - period..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ewm_empty_input() {
        assert!(ewm_mean(&[], 0.5).is_empty());
    }

    #[test]
    fn ewm_rejects_bad_alpha() {
        assert!(ewm_mean(&[1.0, 2.0], 0.0).is_empty());
        assert!(ewm_mean(&[1.0, 2.0], 1.5).is_empty());
    }

    #[test]
    fn ewm_first_value_passes_through() {
        let out = ewm_mean(&[7.0, 1.0, 1.0], 0.25);
        assert!((out[0] - 7.0).abs() < 1e-12);
    }

    #[test]
    fn ewm_matches_closed_form_weights() {
        // alpha = 0.5 => weights 1, 0.5, 0.25 for the newest..oldest.
        let out = ewm_mean(&[4.0, 2.0, 1.0], 0.5);
        assert!((out[1] - (2.0 + 0.5 * 4.0) / 1.5).abs() < 1e-12);
        assert!((out[2] - (1.0 + 0.5 * 2.0 + 0.25 * 4.0) / 1.75).abs() < 1e-12);
    }

    #[test]
    fn ewm_alpha_one_is_identity() {
        let input = [3.0, 9.0, -2.0];
        assert_eq!(ewm_mean(&input, 1.0), input.to_vec());
    }

    #[test]
    fn mean_deviation_basic() {
        // mean = 2.5, deviations 1.5, 0.5, 0.5, 1.5 => 1.0
        let md = mean_deviation(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((md - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mean_deviation_flat_is_zero() {
        assert_eq!(mean_deviation(&[5.0; 8]), Some(0.0));
    }

    #[test]
    fn trailing_window_bounds() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(trailing_window(&v, 4, 3), Some(&v[2..5]));
        assert_eq!(trailing_window(&v, 2, 3), Some(&v[0..3]));
        assert_eq!(trailing_window(&v, 1, 3), None);
        assert_eq!(trailing_window(&v, 5, 3), None);
        assert_eq!(trailing_window(&v, 4, 0), None);
    }
}
