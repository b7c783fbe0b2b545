// =============================================================================
// Commodity Channel Index (CCI)
// =============================================================================
//
//   TP  = (high + low + close) / 3
//   SMA = mean of the trailing `period` typical prices
//   MD  = mean absolute deviation of the same window around SMA
//   CCI = (TP - SMA) / (0.015 * MD)
//
// Unlike RSI, the reading is taken at the newest bar (n-1).
// =============================================================================

use super::ewm::{mean, mean_deviation, trailing_window};
use super::{round2, IndicatorError};
use crate::market_data::Series;
use crate::types::IndicatorKind;

pub const DEFAULT_CCI_PERIOD: usize = 20;

/// Display width of the CCI column.
pub const CCI_WIDTH: usize = 7;

/// Lambert's scaling constant.
const LAMBERT: f64 = 0.015;

/// CCI at index `end` of `typical_prices`.
pub fn cci_at(typical_prices: &[f64], end: usize, period: usize) -> Result<f64, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod {
            indicator: IndicatorKind::Cci,
        });
    }

    let insufficient = || IndicatorError::InsufficientData {
        indicator: IndicatorKind::Cci,
        required: period,
        available: typical_prices.len().min(end + 1),
    };
    let window = trailing_window(typical_prices, end, period).ok_or_else(insufficient)?;
    let sma = mean(window).ok_or_else(insufficient)?;
    let md = mean_deviation(window).ok_or_else(insufficient)?;

    // Equal prices can still leave `md` a few ulps above zero after the sum.
    if md == 0.0 || window.iter().all(|&tp| tp == window[0]) {
        return Err(IndicatorError::DegenerateInput {
            indicator: IndicatorKind::Cci,
            reason: "zero mean deviation",
        });
    }

    let cci = (typical_prices[end] - sma) / (LAMBERT * md);
    if cci.is_finite() {
        Ok(cci)
    } else {
        Err(IndicatorError::DegenerateInput {
            indicator: IndicatorKind::Cci,
            reason: "non-finite result",
        })
    }
}

/// CCI of the newest bar of `series`, rounded to two decimals.
pub fn current_cci(series: &Series, period: usize) -> Result<f64, IndicatorError> {
    let typical = series.typical_prices();
    let end = typical.len().saturating_sub(1);
    cci_at(&typical, end, period).map(round2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{series_from_closes, FIXTURE};
    use crate::market_data::Bar;

    #[test]
    fn matches_reference_fixture() {
        let cci = current_cci(&series_from_closes(&FIXTURE), 20).unwrap();
        assert!((cci - 146.07).abs() <= 0.01, "got {cci}");
    }

    #[test]
    fn flat_prices_are_unavailable() {
        let bars = (0..30)
            .map(|i| Bar::new(i * 60_000, 50.0, 50.0, 50.0, 50.0, 3.0))
            .collect();
        let series = Series::new(bars).unwrap();
        assert_eq!(
            current_cci(&series, 20),
            Err(IndicatorError::DegenerateInput {
                indicator: IndicatorKind::Cci,
                reason: "zero mean deviation",
            })
        );
    }

    #[test]
    fn flat_prices_without_exact_binary_form_are_unavailable() {
        for price in [101.3, 0.1, 12.34, 3.3] {
            let bars = (0..30)
                .map(|i| Bar::new(i * 60_000, price, price, price, price, 1.0))
                .collect();
            let series = Series::new(bars).unwrap();
            assert!(
                matches!(
                    current_cci(&series, 20),
                    Err(IndicatorError::DegenerateInput { .. })
                ),
                "price {price}"
            );
        }
    }

    #[test]
    fn tracks_the_newest_bar() {
        let mut closes = FIXTURE.to_vec();
        let before = current_cci(&series_from_closes(&closes), 20).unwrap();
        *closes.last_mut().unwrap() = 140.0;
        let after = current_cci(&series_from_closes(&closes), 20).unwrap();
        assert!((before - after).abs() > 1.0, "{before} vs {after}");
        assert!((after - 288.89).abs() <= 0.01, "got {after}");
    }

    #[test]
    fn short_series_is_insufficient() {
        let series = series_from_closes(&FIXTURE[..12]);
        assert_eq!(
            current_cci(&series, 20),
            Err(IndicatorError::InsufficientData {
                indicator: IndicatorKind::Cci,
                required: 20,
                available: 12,
            })
        );
    }

    #[test]
    fn exactly_one_window_is_enough() {
        assert!(current_cci(&series_from_closes(&FIXTURE[..20]), 20).is_ok());
    }

    #[test]
    fn repeated_calls_are_identical() {
        let series = series_from_closes(&FIXTURE);
        let a = current_cci(&series, 20).unwrap();
        let b = current_cci(&series, 20).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn cci_at_earlier_index() {
        // Window of 3 typical prices 1, 2, 6: mean 3, MD 2, CCI = 3 / 0.03.
        let tp = [9.0, 1.0, 2.0, 6.0, 4.0];
        let cci = cci_at(&tp, 3, 3).unwrap();
        assert!((cci - 100.0).abs() < 1e-9, "got {cci}");
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(matches!(
            cci_at(&[1.0, 2.0], 1, 0),
            Err(IndicatorError::InvalidPeriod { .. })
        ));
    }
}
