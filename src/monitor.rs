// =============================================================================
// Poll Monitor — sweeps every instrument, prints RSI/CCI, then waits
// =============================================================================
//
//   loop {
//       for each instrument (ticker-major):
//           fetch series -> RSI(n-2), CCI(n-1) -> row (+ green bar if oversold)
//           sleep SHORT_DELAY
//       "< Resume after N seconds >"
//       sleep LONG_DELAY
//   }
//
// Strictly sequential: one fetch at a time, no shared mutable state beyond
// the read-only config.  A failed fetch or an unavailable indicator only
// affects its own row.  The shutdown flag is checked before each instrument
// and raced against every sleep.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::display::{format_report_line, resume_notice, HIGHLIGHT_MARKER, SEPARATOR};
use crate::indicators::{current_cci, current_rsi, IndicatorError};
use crate::market_data::Series;
use crate::runtime_config::MonitorConfig;
use crate::types::{IndicatorKind, IndicatorResult, Instrument};
use crate::upbit::FetchError;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Supplies the bar series for one instrument.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch_series(&self, ticker: &str, interval: &str) -> Result<Series, FetchError>;
}

/// Receives formatted output lines.
pub trait DisplaySink {
    fn emit(&mut self, line: &str, highlight: bool);
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Everything computed for one instrument in one sweep.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub instrument: Instrument,
    pub rsi: Result<IndicatorResult, IndicatorError>,
    pub cci: Result<IndicatorResult, IndicatorError>,
    pub observed_at: DateTime<Local>,
}

impl PollReport {
    /// `true` when RSI is available and at or below `cutoff`.
    pub fn is_oversold(&self, cutoff: f64) -> bool {
        matches!(&self.rsi, Ok(r) if r.value <= cutoff)
    }
}

#[derive(Debug, Default)]
pub struct SweepSummary {
    pub reports: Vec<PollReport>,
    /// Instruments whose fetch failed this sweep.
    pub skipped: usize,
    /// The sweep stopped early on shutdown.
    pub interrupted: bool,
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

pub struct Monitor<S, D, C> {
    config: MonitorConfig,
    instruments: Vec<Instrument>,
    source: S,
    display: D,
    clock: C,
    shutdown: watch::Receiver<bool>,
}

impl<S, D, C> Monitor<S, D, C>
where
    S: SeriesSource,
    D: DisplaySink,
    C: Clock,
{
    /// `config` is expected to have passed [`MonitorConfig::validate`].
    pub fn new(
        config: MonitorConfig,
        source: S,
        display: D,
        clock: C,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let instruments = config.instruments();
        Self {
            config,
            instruments,
            source,
            display,
            clock,
            shutdown,
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sweep forever until shutdown.  Returns the number of completed sweeps.
    pub async fn run(&mut self) -> u64 {
        info!(
            instruments = self.instruments.len(),
            short_delay_secs = self.config.short_delay_secs,
            long_delay_secs = self.config.long_delay_secs,
            "poll loop starting"
        );

        let mut sweeps = 0_u64;
        while !self.is_shutdown() {
            let summary = self.run_sweep().await;
            if summary.interrupted {
                break;
            }
            sweeps += 1;
            info!(
                sweep = sweeps,
                reported = summary.reports.len(),
                skipped = summary.skipped,
                "sweep complete"
            );

            self.display
                .emit(&resume_notice(self.config.long_delay_secs), false);
            self.display.emit(SEPARATOR, false);

            if !self.pause(self.config.long_delay()).await {
                break;
            }
        }

        info!(sweeps, "poll loop stopped");
        sweeps
    }

    /// Poll every instrument once, in order, pausing between instruments.
    pub async fn run_sweep(&mut self) -> SweepSummary {
        let mut summary = SweepSummary::default();
        let instruments = self.instruments.clone();

        for (idx, instrument) in instruments.iter().enumerate() {
            if self.is_shutdown() {
                summary.interrupted = true;
                break;
            }

            match self.poll_instrument(instrument).await {
                Ok(report) => {
                    self.render(&report);
                    summary.reports.push(report);
                }
                Err(e) => {
                    warn!(instrument = %instrument, error = %e, "skipping instrument this cycle");
                    summary.skipped += 1;
                }
            }

            if !self.pause(self.config.short_delay()).await {
                summary.interrupted = true;
                break;
            }

            let ticker_done = instruments
                .get(idx + 1)
                .map_or(true, |next| next.ticker != instrument.ticker);
            if ticker_done {
                self.display.emit(SEPARATOR, false);
            }
        }

        summary
    }

    /// Fetch one instrument and compute both indicators.
    ///
    /// Only a failed fetch is an error; indicator problems are carried inside
    /// the report.
    pub async fn poll_instrument(&self, instrument: &Instrument) -> Result<PollReport, FetchError> {
        let series = self
            .source
            .fetch_series(&instrument.ticker, &instrument.interval)
            .await?;

        let rsi = reading(
            instrument,
            IndicatorKind::Rsi,
            current_rsi(&series, self.config.rsi_period),
        );
        let cci = reading(
            instrument,
            IndicatorKind::Cci,
            current_cci(&series, self.config.cci_period),
        );

        debug!(
            instrument = %instrument,
            bars = series.len(),
            newest_open_time = series.last().map(|b| b.open_time),
            "instrument polled"
        );

        Ok(PollReport {
            instrument: instrument.clone(),
            rsi,
            cci,
            observed_at: self.clock.now(),
        })
    }

    fn render(&mut self, report: &PollReport) {
        self.display.emit(&format_report_line(report), false);
        if report.is_oversold(self.config.rsi_cutoff) {
            self.display.emit(HIGHLIGHT_MARKER, true);
        }
        self.display.emit("", false);
    }

    /// Sleep for `delay` unless shutdown arrives first.  Returns `false` when
    /// the loop should stop.
    async fn pause(&mut self, delay: Duration) -> bool {
        if self.is_shutdown() {
            return false;
        }

        enum Wake {
            Elapsed,
            Signalled,
            SenderGone,
        }

        let wake = tokio::select! {
            biased;
            changed = self.shutdown.changed() => {
                if changed.is_ok() { Wake::Signalled } else { Wake::SenderGone }
            }
            _ = self.clock.sleep(delay) => Wake::Elapsed,
        };

        match wake {
            Wake::Elapsed | Wake::Signalled => !self.is_shutdown(),
            Wake::SenderGone => {
                // Nobody can request shutdown any more; finish the delay.
                self.clock.sleep(delay).await;
                true
            }
        }
    }
}

/// Attach the instrument to an indicator value, logging when unavailable.
fn reading(
    instrument: &Instrument,
    kind: IndicatorKind,
    value: Result<f64, IndicatorError>,
) -> Result<IndicatorResult, IndicatorError> {
    value
        .map(|value| IndicatorResult {
            kind,
            instrument: instrument.clone(),
            value,
        })
        .inspect_err(|e| warn!(instrument = %instrument, error = %e, "indicator unavailable"))
}
