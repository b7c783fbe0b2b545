// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of RSI and CCI.  Every public entry
// point borrows its input and returns `Result<f64, IndicatorError>` so callers
// are forced to handle short series and degenerate windows explicitly.

pub mod cci;
pub mod ewm;
pub mod rsi;

use thiserror::Error;

use crate::types::IndicatorKind;

pub use cci::{current_cci, CCI_WIDTH, DEFAULT_CCI_PERIOD};
pub use rsi::{current_rsi, DEFAULT_RSI_PERIOD, RSI_WIDTH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("{indicator} needs at least {required} bars, got {available}")]
    InsufficientData {
        indicator: IndicatorKind,
        required: usize,
        available: usize,
    },

    #[error("{indicator} undefined: {reason}")]
    DegenerateInput {
        indicator: IndicatorKind,
        reason: &'static str,
    },

    #[error("{indicator} period must be at least 1")]
    InvalidPeriod { indicator: IndicatorKind },
}

/// Round to two decimal places.
///
/// Goes through the exact decimal expansion, so a tie on the stored binary
/// value rounds to even (`0.125` becomes `0.12`) instead of away from zero.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Render `value` and right-pad it with `'0'` to `width` characters.
///
/// Whole numbers keep a `.0` suffix before padding, so `100.0` at width 6
/// becomes `"100.00"` and `30.5` becomes `"30.500"`.  Longer renderings are
/// left untouched.
pub fn pad_fixed(value: f64, width: usize) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    while text.len() < width {
        text.push('0');
    }
    text
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::market_data::{Bar, Series};

    /// 30 closes with mixed up/down moves; RSI(14) = 66.83, CCI(20) = 146.07.
    pub const FIXTURE: [f64; 30] = [
        100.0, 102.0, 101.0, 105.0, 104.0, 107.0, 106.0, 103.0, 108.0, 110.0, 109.0, 112.0,
        111.0, 108.0, 113.0, 115.0, 114.0, 117.0, 116.0, 113.0, 118.0, 120.0, 119.0, 122.0,
        121.0, 118.0, 123.0, 125.0, 124.0, 127.0,
    ];

    /// One-minute bars with `high = close + 1.5` and `low = close - 2.0`.
    pub fn series_from_closes(closes: &[f64]) -> Series {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 60_000, c, c + 1.5, c - 2.0, c, 1.0))
            .collect();
        Series::new(bars).unwrap()
    }
}
