// =============================================================================
// Shared types used across the monitor
// =============================================================================

use serde::{Deserialize, Serialize};

/// A (ticker, interval) pair to poll, e.g. `KRW-BTC` on `minute30`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub ticker: String,
    /// Exchange interval code (`minute30`, `day`, ...).
    pub interval: String,
    /// Short human-readable label (`30m`, `D`, ...).
    pub label: String,
}

impl Instrument {
    pub fn new(
        ticker: impl Into<String>,
        interval: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            interval: interval.into(),
            label: label.into(),
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.ticker, self.interval)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Rsi,
    Cci,
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsi => write!(f, "RSI"),
            Self::Cci => write!(f, "CCI"),
        }
    }
}

/// One indicator reading for one instrument in one poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub kind: IndicatorKind,
    pub instrument: Instrument,
    /// Rounded to two decimals.
    pub value: f64,
}
