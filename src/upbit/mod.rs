// =============================================================================
// Upbit Exchange Module
// =============================================================================
//
// Public candle endpoints only.  The client is the production implementation
// of the monitor's `SeriesSource` collaborator.

pub mod client;
pub mod rate_limit;

use std::str::FromStr;

use thiserror::Error;

pub use client::UpbitClient;

/// Largest `count` the candle endpoints accept.
pub const MAX_CANDLE_COUNT: u32 = 200;

/// The exchange could not provide bars for an instrument this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("data unavailable for {ticker}@{interval}: {reason}")]
    DataUnavailable {
        ticker: String,
        interval: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised interval code '{0}'")]
pub struct UnknownInterval(pub String);

/// Candle resolution, parsed from interval codes such as `minute30` or `day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleUnit {
    Minutes(u32),
    Days,
    Weeks,
    Months,
}

/// Minute resolutions served by `/v1/candles/minutes/{unit}`.
const MINUTE_UNITS: [u32; 8] = [1, 3, 5, 10, 15, 30, 60, 240];

impl CandleUnit {
    /// Path segment below `/v1/candles/`.
    pub fn path(&self) -> String {
        match self {
            Self::Minutes(n) => format!("minutes/{n}"),
            Self::Days => "days".to_string(),
            Self::Weeks => "weeks".to_string(),
            Self::Months => "months".to_string(),
        }
    }
}

impl FromStr for CandleUnit {
    type Err = UnknownInterval;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "day" | "days" => Ok(Self::Days),
            "week" | "weeks" => Ok(Self::Weeks),
            "month" | "months" => Ok(Self::Months),
            other => other
                .strip_prefix("minute")
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|n| MINUTE_UNITS.contains(n))
                .map(Self::Minutes)
                .ok_or_else(|| UnknownInterval(code.to_string())),
        }
    }
}

impl std::fmt::Display for CandleUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minutes(n) => write!(f, "minute{n}"),
            Self::Days => write!(f, "day"),
            Self::Weeks => write!(f, "week"),
            Self::Months => write!(f, "month"),
        }
    }
}
