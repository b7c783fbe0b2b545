// =============================================================================
// Rate-Limit Tracker — watches Upbit's Remaining-Req header
// =============================================================================
//
// Every quotation response carries
//
//   Remaining-Req: group=candles; min=1800; sec=29
//
// where `sec` is the number of requests still allowed in the current
// one-second window for that group.  The tracker keeps the latest value and
// refuses to send while the budget is exhausted and the window has not yet
// rolled over.
// =============================================================================

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Name of the response header carrying the remaining request budget.
pub const REMAINING_REQ_HEADER: &str = "Remaining-Req";

/// Length of the per-second budget window.
const WINDOW: Duration = Duration::from_secs(1);

/// Remaining budget at or below which a warning is logged.
const WARN_THRESHOLD: u32 = 1;

#[derive(Debug, Clone)]
struct Observation {
    group: String,
    remaining_sec: u32,
    observed_at: Instant,
}

/// Thread-safe tracker of the most recent `Remaining-Req` observation.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    last: Mutex<Option<Observation>>,
}

/// Serialisable view of the tracker state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    pub group: Option<String>,
    pub remaining_sec: Option<u32>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from the headers of an Upbit response.
    pub fn update_from_headers(&self, headers: &reqwest::header::HeaderMap) {
        if let Some(raw) = headers
            .get(REMAINING_REQ_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            self.record(raw, Instant::now());
        }
    }

    /// Record a raw header value observed at `at`.
    pub fn record(&self, raw: &str, at: Instant) {
        let Some((group, remaining_sec)) = parse_remaining_req(raw) else {
            warn!(header = raw, "unparseable Remaining-Req header");
            return;
        };

        if remaining_sec <= WARN_THRESHOLD {
            warn!(group = %group, remaining_sec, "request budget nearly exhausted");
        }
        debug!(group = %group, remaining_sec, "rate-limit budget updated from header");

        *self.last.lock() = Some(Observation {
            group,
            remaining_sec,
            observed_at: at,
        });
    }

    /// `false` while the last observed budget is zero and its window is still
    /// open.
    pub fn can_send_request(&self) -> bool {
        match self.last.lock().as_ref() {
            Some(obs) if obs.remaining_sec == 0 => obs.observed_at.elapsed() >= WINDOW,
            _ => true,
        }
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        let last = self.last.lock();
        RateLimitSnapshot {
            group: last.as_ref().map(|o| o.group.clone()),
            remaining_sec: last.as_ref().map(|o| o.remaining_sec),
        }
    }
}

/// Parse `group=candles; min=1800; sec=29` into `("candles", 29)`.
fn parse_remaining_req(raw: &str) -> Option<(String, u32)> {
    let mut group = None;
    let mut sec = None;
    for part in raw.split(';') {
        let (key, value) = part.split_once('=')?;
        match key.trim() {
            "group" => group = Some(value.trim().to_string()),
            "sec" => sec = value.trim().parse::<u32>().ok(),
            _ => {}
        }
    }
    Some((group?, sec?))
}
