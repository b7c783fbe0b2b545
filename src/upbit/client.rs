// =============================================================================
// Upbit REST Client — public candle (OHLCV) endpoints
// =============================================================================
//
// Quotation endpoints need no authentication.  Every request carries a
// client-side timeout so a stalled connection cannot freeze the poll loop.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::rate_limit::{RateLimitSnapshot, RateLimitTracker};
use super::{CandleUnit, FetchError, MAX_CANDLE_COUNT};
use crate::market_data::{Bar, Series};
use crate::monitor::SeriesSource;

pub const DEFAULT_BASE_URL: &str = "https://api.upbit.com";

/// Format of `candle_date_time_utc`.
const CANDLE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One element of the `/v1/candles/*` response array.
#[derive(Debug, Clone, Deserialize)]
struct UpbitCandle {
    candle_date_time_utc: String,
    opening_price: f64,
    high_price: f64,
    low_price: f64,
    trade_price: f64,
    candle_acc_trade_volume: f64,
}

/// Upbit quotation client.
#[derive(Clone)]
pub struct UpbitClient {
    base_url: String,
    candle_count: u32,
    client: reqwest::Client,
    rate_limit: Arc<RateLimitTracker>,
}

impl UpbitClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a client that requests `candle_count` bars per fetch.
    ///
    /// `candle_count` is clamped to `1..=200`.
    pub fn new(base_url: impl Into<String>, candle_count: u32, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "UpbitClient initialised");

        Ok(Self {
            base_url,
            candle_count: candle_count.clamp(1, MAX_CANDLE_COUNT),
            client,
            rate_limit: Arc::new(RateLimitTracker::new()),
        })
    }

    pub fn rate_limit(&self) -> RateLimitSnapshot {
        self.rate_limit.snapshot()
    }

    // -------------------------------------------------------------------------
    // Public market data
    // -------------------------------------------------------------------------

    /// GET /v1/candles/{unit}?market=..&count=..
    ///
    /// Upbit answers newest-first; the returned bars are oldest-first with
    /// duplicate timestamps removed.
    #[instrument(skip(self), name = "upbit::get_candles")]
    pub async fn get_candles(&self, market: &str, unit: CandleUnit) -> Result<Vec<Bar>> {
        if !self.rate_limit.can_send_request() {
            anyhow::bail!("request budget exhausted for this second");
        }

        let url = self.candles_url(market, unit);
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("GET /v1/candles/{} request failed", unit.path()))?;

        self.rate_limit.update_from_headers(resp.headers());

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read candles response body")?;

        if !status.is_success() {
            anyhow::bail!(
                "Upbit GET /v1/candles/{} returned {}: {}",
                unit.path(),
                status,
                body
            );
        }

        let raw: Vec<UpbitCandle> =
            serde_json::from_str(&body).context("failed to parse candles response")?;
        let bars = bars_oldest_first(raw)?;

        debug!(market, unit = %unit, count = bars.len(), "candles fetched");
        Ok(bars)
    }

    fn candles_url(&self, market: &str, unit: CandleUnit) -> String {
        format!(
            "{}/v1/candles/{}?market={}&count={}",
            self.base_url,
            unit.path(),
            market,
            self.candle_count
        )
    }
}

#[async_trait]
impl SeriesSource for UpbitClient {
    async fn fetch_series(&self, ticker: &str, interval: &str) -> Result<Series, FetchError> {
        let unavailable = |reason: String| FetchError::DataUnavailable {
            ticker: ticker.to_string(),
            interval: interval.to_string(),
            reason,
        };

        let unit: CandleUnit = interval.parse().map_err(|e| unavailable(format!("{e}")))?;
        let bars = self
            .get_candles(ticker, unit)
            .await
            .map_err(|e| unavailable(format!("{e:#}")))?;

        if bars.len() < self.candle_count as usize {
            debug!(
                ticker,
                interval,
                requested = self.candle_count,
                received = bars.len(),
                "short series returned"
            );
        }

        Series::new(bars).map_err(|e| unavailable(e.to_string()))
    }
}

impl std::fmt::Debug for UpbitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpbitClient")
            .field("base_url", &self.base_url)
            .field("candle_count", &self.candle_count)
            .field("rate_limit", &self.rate_limit.snapshot())
            .finish()
    }
}

// -------------------------------------------------------------------------
// Internal helpers
// -------------------------------------------------------------------------

/// Convert the newest-first response into oldest-first bars.
fn bars_oldest_first(raw: Vec<UpbitCandle>) -> Result<Vec<Bar>> {
    let mut bars = raw
        .into_iter()
        .map(|c| {
            let open_time = NaiveDateTime::parse_from_str(&c.candle_date_time_utc, CANDLE_TIME_FORMAT)
                .with_context(|| format!("bad candle timestamp '{}'", c.candle_date_time_utc))?
                .and_utc()
                .timestamp_millis();
            Ok(Bar::new(
                open_time,
                c.opening_price,
                c.high_price,
                c.low_price,
                c.trade_price,
                c.candle_acc_trade_volume,
            ))
        })
        .collect::<Result<Vec<Bar>>>()?;

    bars.sort_by_key(|b| b.open_time);
    let before = bars.len();
    bars.dedup_by_key(|b| b.open_time);
    if bars.len() != before {
        warn!(dropped = before - bars.len(), "duplicate candle timestamps removed");
    }
    Ok(bars)
}
