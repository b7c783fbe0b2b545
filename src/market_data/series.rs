use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar as returned by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Candle start in epoch milliseconds (UTC).
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(open_time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `(high + low + close) / 3`.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("series contains no bars")]
    Empty,

    #[error("bar {index} (open_time={open_time}) is not newer than its predecessor")]
    OutOfOrder { index: usize, open_time: i64 },
}

// ---------------------------------------------------------------------------
// Series -- immutable, oldest-first
// ---------------------------------------------------------------------------

/// An ordered run of bars, oldest first, with strictly increasing timestamps.
///
/// A `Series` is never modified after construction: indicators only borrow the
/// bars and keep any derived columns in their own buffers.  It may hold fewer
/// bars than were requested from the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Wrap `bars`, rejecting empty input and any timestamp that does not
    /// strictly increase.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].open_time <= pair[0].open_time {
                return Err(SeriesError::OutOfOrder {
                    index: index + 1,
                    open_time: pair[1].open_time,
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Typical prices, oldest first.
    pub fn typical_prices(&self) -> Vec<f64> {
        self.bars.iter().map(Bar::typical_price).collect()
    }

    /// The most recent bar (possibly still in progress on the exchange).
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}
