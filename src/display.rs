// =============================================================================
// Console Display — indicator table on stdout
// =============================================================================
//
//   KRW-BTC  | Time Frame : 30m | RSI : 28.410 | CCI : -132.07 | 2024-03-01 10:00:05.123456
//
// Oversold rows are followed by a green bar.  Diagnostics go through
// `tracing` (stderr); only the table is written here.
// =============================================================================

use std::io::Write;

use crossterm::style::{style, Stylize};
use tracing::warn;

use crate::indicators::{pad_fixed, IndicatorError, CCI_WIDTH, RSI_WIDTH};
use crate::monitor::{DisplaySink, PollReport};
use crate::types::IndicatorResult;

/// Printed after every ticker and after the resume notice.
pub const SEPARATOR: &str = "\n--------------------------------------------\n";

/// The bar drawn under an oversold row.
pub const HIGHLIGHT_MARKER: &str = "                     ";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Rendering of an indicator that could not be computed.
const UNAVAILABLE: &str = "N/A";

/// Format one table row for `report`.
pub fn format_report_line(report: &PollReport) -> String {
    format!(
        "{:<8} | Time Frame : {:<3} | RSI : {} | CCI : {} | {}",
        report.instrument.ticker,
        report.instrument.label,
        format_cell(&report.rsi, RSI_WIDTH),
        format_cell(&report.cci, CCI_WIDTH),
        report.observed_at.format(TIMESTAMP_FORMAT),
    )
}

pub fn resume_notice(seconds: u64) -> String {
    format!("\n< Resume after {seconds} seconds >\n")
}

fn format_cell(result: &Result<IndicatorResult, IndicatorError>, width: usize) -> String {
    match result {
        Ok(r) => pad_fixed(r.value, width),
        Err(_) => format!("{UNAVAILABLE:<width$}"),
    }
}

/// Writes lines to any `Write`, stdout by default.
pub struct ConsoleDisplay<W: Write = std::io::Stdout> {
    out: W,
    colour: bool,
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout(colour: bool) -> Self {
        Self::new(std::io::stdout(), colour)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, colour: bool) -> Self {
        Self { out, colour }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn emit(&mut self, line: &str, highlight: bool) {
        let written = if highlight && self.colour {
            writeln!(self.out, "{}", style(line).on_green())
        } else {
            writeln!(self.out, "{line}")
        };

        if let Err(e) = written.and_then(|_| self.out.flush()) {
            warn!(error = %e, "failed to write to console");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::types::{IndicatorKind, Instrument};

    fn report(rsi: Option<f64>, cci: Option<f64>) -> PollReport {
        let instrument = Instrument::new("KRW-BTC", "minute30", "30m");
        let reading = |kind: IndicatorKind, value: Option<f64>| match value {
            Some(value) => Ok(IndicatorResult {
                kind,
                instrument: instrument.clone(),
                value,
            }),
            None => Err(IndicatorError::DegenerateInput {
                indicator: kind,
                reason: "test",
            }),
        };
        PollReport {
            rsi: reading(IndicatorKind::Rsi, rsi),
            cci: reading(IndicatorKind::Cci, cci),
            instrument: instrument.clone(),
            observed_at: Local.with_ymd_and_hms(2024, 3, 1, 10, 0, 5).unwrap(),
        }
    }

    #[test]
    fn row_layout() {
        let line = format_report_line(&report(Some(28.41), Some(-132.07)));
        assert_eq!(
            line,
            "KRW-BTC  | Time Frame : 30m | RSI : 28.410 | CCI : -132.07 | 2024-03-01 10:00:05.000000"
        );
    }

    #[test]
    fn unavailable_cells_keep_column_width() {
        let line = format_report_line(&report(None, None));
        assert!(line.contains("| RSI : N/A    |"), "{line}");
        assert!(line.contains("| CCI : N/A     |"), "{line}");
    }

    #[test]
    fn resume_notice_names_the_delay() {
        assert_eq!(resume_notice(300), "\n< Resume after 300 seconds >\n");
    }

    #[test]
    fn plain_display_writes_lines() {
        let mut display = ConsoleDisplay::new(Vec::new(), false);
        display.emit("hello", false);
        display.emit(HIGHLIGHT_MARKER, true);
        let text = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(text, format!("hello\n{HIGHLIGHT_MARKER}\n"));
    }

    #[test]
    fn coloured_highlight_uses_escape_codes() {
        let mut display = ConsoleDisplay::new(Vec::new(), true);
        display.emit(HIGHLIGHT_MARKER, true);
        display.emit("plain", false);
        let text = String::from_utf8(display.into_inner()).unwrap();
        // crossterm honours NO_COLOR even when asked to style.
        assert!(std::env::var_os("NO_COLOR").is_some() || text.starts_with('\u{1b}'), "{text:?}");
        assert!(text.contains(HIGHLIGHT_MARKER));
        assert!(text.ends_with("plain\n"));
    }
}
