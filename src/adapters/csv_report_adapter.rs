//! CSV report adapter implementing ReportPort.
//!
//! Writes four files into the output directory, each prefixed with the
//! strategy name:
//! - `{name}_trades.csv`: one row per completed trade;
//! - `{name}_minutes.csv`: every bar with a non-zero return;
//! - `{name}.csv`: daily and cumulative return;
//! - `{name}_summary.txt`: the scalar report.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::domain::metrics::PerformanceReport;
use crate::domain::session::date_key;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

#[derive(Serialize)]
struct TradeRow<'a> {
    date: u32,
    symbol: &'a str,
    entry_bar: usize,
    entry_price: f64,
    exit_bar: usize,
    exit_price: f64,
    exit_date: u32,
    size: f64,
    pnl: f64,
    forced_close: bool,
}

#[derive(Serialize)]
struct MinuteRow {
    date: u32,
    bar: usize,
    open: f64,
    close: f64,
    position: f64,
    ret: f64,
}

#[derive(Serialize)]
struct DailyRow {
    date: u32,
    ret: f64,
    cum_ret: f64,
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn trades_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}_trades.csv"))
    }

    pub fn minutes_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}_minutes.csv"))
    }

    pub fn daily_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.csv"))
    }

    pub fn summary_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}_summary.txt"))
    }
}

fn write_rows<T: Serialize>(
    path: &Path,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), BacktestError> {
    let report_error = |e: csv::Error| BacktestError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    };
    let mut wtr = csv::Writer::from_path(path).map_err(report_error)?;
    for row in rows {
        wtr.serialize(row).map_err(report_error)?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        name: &str,
        result: &BacktestResult,
        report: &PerformanceReport,
    ) -> Result<(), BacktestError> {
        fs::create_dir_all(&self.output_dir)?;

        write_rows(
            &self.trades_path(name),
            result.trades.iter().map(|t| TradeRow {
                date: date_key(t.entry_date),
                symbol: &t.symbol,
                entry_bar: t.entry_bar,
                entry_price: t.entry_price,
                exit_bar: t.exit_bar,
                exit_price: t.exit_price,
                exit_date: date_key(t.exit_date),
                size: t.size,
                pnl: t.pnl,
                forced_close: t.forced_close,
            }),
        )?;

        write_rows(
            &self.minutes_path(name),
            result.bar_returns.iter().map(|r| MinuteRow {
                date: date_key(r.date),
                bar: r.bar,
                open: r.open,
                close: r.close,
                position: r.position,
                ret: r.ret,
            }),
        )?;

        write_rows(
            &self.daily_path(name),
            result
                .daily
                .iter()
                .zip(&report.cumulative)
                .map(|(d, &cum_ret)| DailyRow {
                    date: date_key(d.date),
                    ret: d.ret,
                    cum_ret,
                }),
        )?;

        let mut summary = format!("{name}\n{report}\n");
        if !result.skipped.is_empty() {
            summary.push_str(&format!("Skipped Sessions:  {}\n", result.skipped.len()));
            for s in &result.skipped {
                summary.push_str(&format!("  {}: {}\n", date_key(s.date), s.reason));
            }
        }
        fs::write(self.summary_path(name), summary)?;

        tracing::info!(dir = %self.output_dir.display(), name, "report written");
        Ok(())
    }
}
