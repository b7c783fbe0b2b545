// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1: change[i] = close[i] - close[i-1]                (i >= 1)
// Step 2: up[i] = max(change, 0),  down[i] = max(-change, 0)
// Step 3: avg_up / avg_down = adjusted exponential-weighted mean with
//          alpha = 1 / period (see `ewm.rs`)
// Step 4: RS  = avg_up / avg_down
//          RSI = 100 - 100 / (1 + RS);  avg_down == 0  =>  RSI = 100
//
// The reported reading is taken at bar n-2: the newest bar is usually still
// forming on the exchange and is ignored.
// =============================================================================

use super::ewm::ewm_mean;
use super::{round2, IndicatorError};
use crate::market_data::Series;
use crate::types::IndicatorKind;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Display width of the RSI column.
pub const RSI_WIDTH: usize = 6;

/// Compute the full RSI series for `closes`.
///
/// Element `k` of the result is the RSI at close `k + 1` (the first close has
/// no change and therefore no RSI).
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - fewer than two closes => empty vec
/// - average loss of zero => 100.0
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < 2 {
        return Vec::new();
    }

    let (ups, downs): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let alpha = 1.0 / period as f64;
    let avg_up = ewm_mean(&ups, alpha);
    let avg_down = ewm_mean(&downs, alpha);

    avg_up
        .iter()
        .zip(&avg_down)
        .map(|(&up, &down)| rsi_from_averages(up, down))
        .collect()
}

/// RSI of the second-to-last bar of `series`, rounded to two decimals.
///
/// Requires `period + 2` bars: `period` changes to smooth over, plus the
/// excluded in-progress bar.
pub fn current_rsi(series: &Series, period: usize) -> Result<f64, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod {
            indicator: IndicatorKind::Rsi,
        });
    }

    let required = period + 2;
    if series.len() < required {
        return Err(IndicatorError::InsufficientData {
            indicator: IndicatorKind::Rsi,
            required,
            available: series.len(),
        });
    }

    let rsi = calculate_rsi(&series.closes(), period);
    // rsi[k] belongs to bar k + 1, so bar n - 2 is rsi[n - 3].
    let value = rsi[series.len() - 3];
    if !value.is_finite() {
        return Err(IndicatorError::DegenerateInput {
            indicator: IndicatorKind::Rsi,
            reason: "non-finite price change",
        });
    }

    Ok(round2(value))
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_up: f64, avg_down: f64) -> f64 {
    if avg_down == 0.0 {
        return 100.0; // No losses in the window.
    }
    let rs = avg_up / avg_down;
    100.0 - 100.0 / (1.0 + rs)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{series_from_closes, FIXTURE};

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn rsi_one_value_per_change() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        assert_eq!(calculate_rsi(&closes, 14).len(), 19);
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for &v in &calculate_rsi(&closes, 14) {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for &v in &calculate_rsi(&closes, 14) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    // ---- current_rsi -----------------------------------------------------

    #[test]
    fn rising_series_is_exactly_100() {
        let closes: Vec<f64> = (1..=40).map(|x| 100.0 + x as f64).collect();
        let rsi = current_rsi(&series_from_closes(&closes), 14).unwrap();
        assert_eq!(rsi, 100.0);
    }

    #[test]
    fn alternating_series_hovers_around_50() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 + (i % 2) as f64).collect();
        let rsi = current_rsi(&series_from_closes(&closes), 14).unwrap();
        assert!((rsi - 50.0).abs() < 2.0, "got {rsi}");

        // A longer period weights each swing less, pulling closer to 50.
        let slow = current_rsi(&series_from_closes(&closes), 50).unwrap();
        assert!((slow - 50.0).abs() < (rsi - 50.0).abs());
    }

    #[test]
    fn ignores_the_newest_bar() {
        let mut closes = FIXTURE.to_vec();
        let before = current_rsi(&series_from_closes(&closes), 14).unwrap();
        *closes.last_mut().unwrap() = 10.0;
        let after = current_rsi(&series_from_closes(&closes), 14).unwrap();
        assert_eq!(before.to_bits(), after.to_bits());
    }

    #[test]
    fn matches_reference_fixture() {
        let rsi = current_rsi(&series_from_closes(&FIXTURE), 14).unwrap();
        assert!((rsi - 66.83).abs() <= 0.01, "got {rsi}");
    }

    #[test]
    fn repeated_calls_are_identical() {
        let series = series_from_closes(&FIXTURE);
        let snapshot = series.clone();
        let a = current_rsi(&series, 14).unwrap();
        let b = current_rsi(&series, 14).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(series, snapshot);
    }

    #[test]
    fn short_series_is_insufficient() {
        let series = series_from_closes(&FIXTURE[..10]);
        assert_eq!(
            current_rsi(&series, 14),
            Err(IndicatorError::InsufficientData {
                indicator: IndicatorKind::Rsi,
                required: 16,
                available: 10,
            })
        );
    }

    #[test]
    fn minimum_length_is_accepted() {
        assert!(current_rsi(&series_from_closes(&FIXTURE[..16]), 14).is_ok());
        assert!(current_rsi(&series_from_closes(&FIXTURE[..15]), 14).is_err());
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(matches!(
            current_rsi(&series_from_closes(&FIXTURE), 0),
            Err(IndicatorError::InvalidPeriod { .. })
        ));
    }
}
