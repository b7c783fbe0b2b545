// =============================================================================
// Runtime Configuration — monitor settings loaded once at startup
// =============================================================================
//
// Every tunable lives here and is handed to the poll loop explicitly; there
// are no process-wide settings.  All fields carry `#[serde(default)]` so a
// partial JSON file only needs to name what it changes.
//
// Loading order: JSON file -> MONITOR_TICKERS env var -> CLI flags ->
// `validate()`.  Validation failures are fatal before the loop starts.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::indicators::{DEFAULT_CCI_PERIOD, DEFAULT_RSI_PERIOD};
use crate::types::Instrument;
use crate::upbit::client::DEFAULT_BASE_URL;
use crate::upbit::{CandleUnit, UnknownInterval, MAX_CANDLE_COUNT};

/// Environment variable holding a comma-separated ticker list.
pub const TICKERS_ENV: &str = "MONITOR_TICKERS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    UnknownInterval(#[from] UnknownInterval),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_tickers() -> Vec<String> {
    [
        "KRW-BTC", "KRW-XRP", "KRW-ETH", "KRW-SOL", "KRW-DOGE", "KRW-SHIB", "KRW-SUI",
        "KRW-LINK", "KRW-ADA", "KRW-PEPE",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_intervals() -> Vec<IntervalLabel> {
    vec![
        IntervalLabel::new("minute30", "30m"),
        IntervalLabel::new("minute60", "1h"),
        IntervalLabel::new("minute240", "4h"),
        IntervalLabel::new("day", "D"),
    ]
}

fn default_rsi_cutoff() -> f64 {
    30.0
}

fn default_cci_cutoff() -> f64 {
    -100.0
}

fn default_short_delay_secs() -> u64 {
    5
}

fn default_long_delay_secs() -> u64 {
    300
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_cci_period() -> usize {
    DEFAULT_CCI_PERIOD
}

fn default_candle_count() -> u32 {
    MAX_CANDLE_COUNT
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

// =============================================================================
// IntervalLabel
// =============================================================================

/// Maps an exchange interval code to the label shown in the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalLabel {
    pub code: String,
    pub label: String,
}

impl IntervalLabel {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

// =============================================================================
// MonitorConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- What to poll --------------------------------------------------------

    /// Markets in polling order.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,

    /// Interval codes and their display labels, in polling order.
    #[serde(default = "default_intervals")]
    pub intervals: Vec<IntervalLabel>,

    // --- Highlighting --------------------------------------------------------

    /// An RSI at or below this value is highlighted.
    #[serde(default = "default_rsi_cutoff")]
    pub rsi_cutoff: f64,

    /// Reserved for a combined RSI/CCI signal; not read by the poll loop.
    #[serde(default = "default_cci_cutoff")]
    pub cci_cutoff: f64,

    // --- Scheduling ----------------------------------------------------------

    /// Pause between consecutive instruments.
    #[serde(default = "default_short_delay_secs")]
    pub short_delay_secs: u64,

    /// Pause between full sweeps.
    #[serde(default = "default_long_delay_secs")]
    pub long_delay_secs: u64,

    // --- Indicators ----------------------------------------------------------

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_cci_period")]
    pub cci_period: usize,

    // --- Exchange ------------------------------------------------------------

    /// Bars requested per fetch (at most 200).
    #[serde(default = "default_candle_count")]
    pub candle_count: u32,

    /// Per-request timeout for candle fetches.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            intervals: default_intervals(),
            rsi_cutoff: default_rsi_cutoff(),
            cci_cutoff: default_cci_cutoff(),
            short_delay_secs: default_short_delay_secs(),
            long_delay_secs: default_long_delay_secs(),
            rsi_period: default_rsi_period(),
            cci_period: default_cci_period(),
            candle_count: default_candle_count(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            base_url: default_base_url(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            tickers = ?config.tickers,
            "monitor config loaded"
        );

        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    /// A file that exists and cannot be read or parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Replace the ticker list from [`TICKERS_ENV`] when it is set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(TICKERS_ENV) {
            self.set_tickers_from_list(&raw);
            info!(env = TICKERS_ENV, tickers = ?self.tickers, "tickers overridden from environment");
        }
    }

    /// Parse a comma-separated ticker list, upper-casing and dropping blanks.
    pub fn set_tickers_from_list(&mut self, raw: &str) {
        self.tickers = raw
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }

    /// Reject configurations the poll loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.tickers.is_empty() {
            return invalid("ticker list is empty");
        }
        if self.intervals.is_empty() {
            return invalid("interval list is empty");
        }
        for interval in &self.intervals {
            interval.code.parse::<CandleUnit>()?;
            if interval.label.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "interval '{}' has an empty label",
                    interval.code
                )));
            }
        }
        if self.rsi_period == 0 || self.cci_period == 0 {
            return invalid("indicator periods must be positive");
        }
        if self.short_delay_secs == 0 || self.long_delay_secs == 0 {
            return invalid("delays must be positive");
        }
        if self.fetch_timeout_secs == 0 {
            return invalid("fetch timeout must be positive");
        }
        if self.candle_count == 0 || self.candle_count > MAX_CANDLE_COUNT {
            return Err(ConfigError::Invalid(format!(
                "candle_count must be between 1 and {MAX_CANDLE_COUNT}"
            )));
        }
        let needed = (self.rsi_period + 2).max(self.cci_period);
        if (self.candle_count as usize) < needed {
            return Err(ConfigError::Invalid(format!(
                "candle_count {} is below the {needed} bars the indicators need",
                self.candle_count
            )));
        }
        if !self.rsi_cutoff.is_finite() || !self.cci_cutoff.is_finite() {
            return invalid("cutoffs must be finite numbers");
        }
        Ok(())
    }

    /// Every (ticker, interval) pair, ticker-major.
    pub fn instruments(&self) -> Vec<Instrument> {
        self.tickers
            .iter()
            .flat_map(|ticker| {
                self.intervals
                    .iter()
                    .map(move |iv| Instrument::new(ticker.clone(), iv.code.clone(), iv.label.clone()))
            })
            .collect()
    }

    pub fn short_delay(&self) -> Duration {
        Duration::from_secs(self.short_delay_secs)
    }

    pub fn long_delay(&self) -> Duration {
        Duration::from_secs(self.long_delay_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
