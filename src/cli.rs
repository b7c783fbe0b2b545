use std::path::PathBuf;

use clap::Parser;

use crate::runtime_config::MonitorConfig;

/// Poll Upbit candles and print RSI / CCI, highlighting oversold markets.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON config file; missing file means defaults.
    #[arg(short, long, default_value = "monitor_config.json")]
    pub config: PathBuf,

    /// Market to poll (repeatable); replaces the configured list.
    #[arg(short, long = "ticker", value_name = "MARKET")]
    pub tickers: Vec<String>,

    /// Seconds between instruments.
    #[arg(long, value_name = "SECS")]
    pub short_delay: Option<u64>,

    /// Seconds between full sweeps.
    #[arg(long, value_name = "SECS")]
    pub long_delay: Option<u64>,

    /// Run a single sweep and exit.
    #[arg(long)]
    pub once: bool,

    /// Disable the coloured highlight bar.
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Apply command-line overrides on top of file and env settings.
    pub fn apply_to(&self, config: &mut MonitorConfig) {
        if !self.tickers.is_empty() {
            config.set_tickers_from_list(&self.tickers.join(","));
        }
        if let Some(secs) = self.short_delay {
            config.short_delay_secs = secs;
        }
        if let Some(secs) = self.long_delay {
            config.long_delay_secs = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["oversold-watch"]);
        assert_eq!(args.config, PathBuf::from("monitor_config.json"));
        assert!(args.tickers.is_empty());
        assert!(!args.once);
        assert!(!args.no_color);
    }

    #[test]
    fn overrides_replace_config_values() {
        let args = Args::parse_from([
            "oversold-watch",
            "--ticker",
            "krw-eth",
            "-t",
            "KRW-SOL",
            "--short-delay",
            "1",
            "--long-delay",
            "60",
            "--once",
        ]);
        let mut cfg = MonitorConfig::default();
        args.apply_to(&mut cfg);
        assert_eq!(cfg.tickers, vec!["KRW-ETH", "KRW-SOL"]);
        assert_eq!(cfg.short_delay_secs, 1);
        assert_eq!(cfg.long_delay_secs, 60);
        assert!(args.once);
    }

    #[test]
    fn no_overrides_keep_config() {
        let args = Args::parse_from(["oversold-watch", "-c", "other.json"]);
        let mut cfg = MonitorConfig::default();
        args.apply_to(&mut cfg);
        assert_eq!(cfg.tickers.len(), 10);
        assert_eq!(cfg.long_delay_secs, 300);
        assert_eq!(args.config, PathBuf::from("other.json"));
    }

    #[test]
    fn zero_delay_passes_parsing_but_fails_validation() {
        let args = Args::parse_from(["oversold-watch", "--short-delay", "0"]);
        let mut cfg = MonitorConfig::default();
        args.apply_to(&mut cfg);
        assert!(cfg.validate().is_err());
    }
}
