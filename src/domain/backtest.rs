//! Multi-day aggregation.
//!
//! Drives the day runner over an ordered list of trading days, skipping days
//! without usable data, and collects daily returns, trades and the minute
//! return ledger. Sessions never share state; each gets a freshly built
//! signal source.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use super::day_runner::{run_session, BarReturn, DayResult};
use super::error::BacktestError;
use super::ledger::Trade;
use super::metrics::cumulative_returns;
use super::signal::SignalSource;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    /// Earliest session to include (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Latest session to include (inclusive).
    pub end_date: Option<NaiveDate>,
    /// Fraction of a bar's return lost on bars where the position changes.
    pub cost_rate: f64,
    /// Expected bars per session; sessions of another length are skipped.
    pub session_bars: Option<usize>,
    pub parallel: bool,
}

impl BacktestConfig {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            start_date: None,
            end_date: None,
            cost_rate: 0.0,
            session_bars: None,
            parallel: false,
        }
    }

    pub fn includes(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|s| date >= s) && self.end_date.is_none_or(|e| date <= e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub ret: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSession {
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BacktestResult {
    pub daily: Vec<DailyResult>,
    pub trades: Vec<Trade>,
    pub bar_returns: Vec<BarReturn>,
    pub skipped: Vec<SkippedSession>,
}

impl BacktestResult {
    pub fn cumulative_returns(&self) -> Vec<f64> {
        let returns: Vec<f64> = self.daily.iter().map(|d| d.ret).collect();
        cumulative_returns(&returns)
    }
}

/// Owns the run's accumulators; the only place they are mutated.
#[derive(Debug, Default)]
struct Aggregator {
    result: BacktestResult,
    cumulative: f64,
}

impl Aggregator {
    fn record(&mut self, day: DayResult) -> (&DailyResult, f64) {
        self.cumulative += day.daily_return;
        tracing::info!(
            date = %day.date,
            ret = day.daily_return,
            trades = day.trades.len(),
            "session processed"
        );

        self.result.trades.extend(day.trades);
        self.result.bar_returns.extend(day.bar_returns);
        self.result.daily.push(DailyResult {
            date: day.date,
            ret: day.daily_return,
        });
        let last = self.result.daily.len() - 1;
        (&self.result.daily[last], self.cumulative)
    }

    fn skip(&mut self, date: NaiveDate, err: &BacktestError) {
        tracing::warn!(%date, "skipping session: {err}");
        self.result.skipped.push(SkippedSession {
            date,
            reason: err.to_string(),
        });
    }

    fn absorb(
        &mut self,
        date: NaiveDate,
        outcome: Result<DayResult, BacktestError>,
    ) -> Result<Option<(&DailyResult, f64)>, BacktestError> {
        match outcome {
            Ok(day) => Ok(Some(self.record(day))),
            Err(e) if e.is_recoverable() => {
                self.skip(date, &e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Days to evaluate: ascending, deduplicated, inside the configured window.
pub fn eligible_days(days: &[NaiveDate], config: &BacktestConfig) -> Vec<NaiveDate> {
    let mut eligible: Vec<NaiveDate> = days
        .iter()
        .copied()
        .filter(|&d| config.includes(d))
        .collect();
    eligible.sort();
    eligible.dedup();
    eligible
}

/// Load and run one session.
pub fn evaluate_day<D, S>(
    data: &D,
    date: NaiveDate,
    source: &mut S,
    config: &BacktestConfig,
) -> Result<DayResult, BacktestError>
where
    D: DataPort + ?Sized,
    S: SignalSource + ?Sized,
{
    let session = data.fetch_session(&config.symbol, date)?;
    if let Some(expected) = config.session_bars {
        if session.len() != expected {
            return Err(BacktestError::MalformedSession {
                symbol: config.symbol.clone(),
                date,
                reason: format!("expected {} bars, found {}", expected, session.len()),
            });
        }
    }
    run_session(&session, source, config.cost_rate)
}

/// Run the backtest over `days`.
///
/// `make_source` builds a fresh signal source per session. `on_day` receives
/// each processed day with the running cumulative return, in date order.
/// Missing or malformed sessions are skipped and listed in the result; an
/// invariant violation aborts the run.
pub fn run_backtest<D, M, S, F>(
    data: &D,
    days: &[NaiveDate],
    config: &BacktestConfig,
    make_source: M,
    mut on_day: F,
) -> Result<BacktestResult, BacktestError>
where
    D: DataPort + Sync + ?Sized,
    M: Fn() -> S + Sync,
    S: SignalSource,
    F: FnMut(&DailyResult, f64),
{
    let days = eligible_days(days, config);
    let mut agg = Aggregator::default();

    if config.parallel {
        let outcomes: Vec<(NaiveDate, Result<DayResult, BacktestError>)> = days
            .par_iter()
            .map(|&date| {
                let mut source = make_source();
                (date, evaluate_day(data, date, &mut source, config))
            })
            .collect();

        for (date, outcome) in outcomes {
            if let Some((day, cum)) = agg.absorb(date, outcome)? {
                on_day(day, cum);
            }
        }
    } else {
        for date in days {
            let mut source = make_source();
            let outcome = evaluate_day(data, date, &mut source, config);
            if let Some((day, cum)) = agg.absorb(date, outcome)? {
                on_day(day, cum);
            }
        }
    }

    Ok(agg.result)
}
