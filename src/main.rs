// =============================================================================
// Oversold Watch — Main Entry Point
// =============================================================================
//
// Loads configuration, fails fast on anything invalid, then hands control to
// the poll loop until Ctrl+C.  Exit code 0 on graceful shutdown, non-zero on
// a configuration error.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod cli;
mod clock;
mod display;
mod indicators;
mod market_data;
mod monitor;
mod runtime_config;
mod types;
mod upbit;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::clock::SystemClock;
use crate::display::ConsoleDisplay;
use crate::monitor::{DisplaySink, Monitor};
use crate::runtime_config::MonitorConfig;
use crate::upbit::UpbitClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // ── 2. Config (fatal if invalid) ─────────────────────────────────────
    let mut config = MonitorConfig::load_or_default(&args.config)
        .context("failed to load monitor config")?;
    config.apply_env_overrides();
    args.apply_to(&mut config);
    config.validate().context("invalid monitor config")?;

    info!(
        tickers = ?config.tickers,
        intervals = ?config.intervals.iter().map(|i| i.code.as_str()).collect::<Vec<_>>(),
        rsi_cutoff = config.rsi_cutoff,
        cci_cutoff = config.cci_cutoff,
        "configuration accepted"
    );

    // ── 3. Collaborators ─────────────────────────────────────────────────
    let client = UpbitClient::new(
        config.base_url.clone(),
        config.candle_count,
        config.fetch_timeout(),
    )?;

    let mut display = ConsoleDisplay::stdout(!args.no_color);
    display.emit("\nRunning indicator analysis...\n", false);

    // ── 4. Shutdown signal ───────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Shutdown signal received, stopping at the next pause");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!(error = %e, "failed to listen for Ctrl+C"),
        }
    });

    // ── 5. Poll loop ─────────────────────────────────────────────────────
    let mut monitor = Monitor::new(config, client.clone(), display, SystemClock, shutdown_rx);
    info!(instruments = monitor.instruments().len(), "monitor ready");

    if args.once {
        let summary = monitor.run_sweep().await;
        info!(
            reported = summary.reports.len(),
            skipped = summary.skipped,
            interrupted = summary.interrupted,
            "single sweep finished"
        );
    } else {
        monitor.run().await;
    }

    info!(rate_limit = ?client.rate_limit(), "Oversold Watch shut down complete.");
    Ok(())
}
