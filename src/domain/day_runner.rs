//! Single-session simulation loop.
//!
//! For each bar: ask the source for a decision (after warmup), step the
//! position state machine, attribute the bar's return using the position held
//! entering the bar, and feed the ledger. The position decided at bar `i`
//! earns bar `i + 1`'s return.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::BacktestError;
use super::ledger::{Trade, TradeLedger};
use super::position::PositionStateMachine;
use super::session::Session;
use super::signal::{sanitize_signal, Decision, SignalContext, SignalSource};

/// Absolute tolerance for trade PnL reconciliation, scaled by the day's size.
pub const RECONCILE_TOLERANCE: f64 = 1e-9;

/// One bar with a non-zero return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarReturn {
    pub date: NaiveDate,
    pub bar: usize,
    pub open: f64,
    pub close: f64,
    pub position: f64,
    pub ret: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayResult {
    pub date: NaiveDate,
    pub daily_return: f64,
    pub trades: Vec<Trade>,
    pub bar_returns: Vec<BarReturn>,
    /// Held position decided at each bar.
    pub held: Vec<f64>,
}

/// Cost multiplier applied to a bar's return. Only bars where the held
/// position changes pay the cost.
pub fn cost_multiplier(cost_rate: f64, prior_held: f64, held: f64) -> f64 {
    if prior_held != held {
        1.0 - cost_rate
    } else {
        1.0
    }
}

/// Return of one bar for the position held entering it.
pub fn bar_return(prior_held: f64, open: f64, close: f64) -> f64 {
    prior_held * (close / open - 1.0)
}

/// Run one session through `source` and reconstruct its trades.
pub fn run_session<S: SignalSource + ?Sized>(
    session: &Session,
    source: &mut S,
    cost_rate: f64,
) -> Result<DayResult, BacktestError> {
    source.prepare(session);
    let machine = PositionStateMachine::for_source(&*source);
    let mut ledger = TradeLedger::new(session.symbol(), session.date());

    let mut held_path = Vec::with_capacity(session.len());
    let mut bar_returns = Vec::new();
    let mut daily_return = 0.0;
    let mut prior_held = 0.0;
    let mut prior_signal = 0.0;

    for (i, bar) in session.bars().iter().enumerate() {
        let decision = if machine.in_warmup(i) {
            Decision::neutral()
        } else {
            source.decide(&SignalContext {
                index: i,
                prior_held,
                prior_signal,
            })
        };
        let held = machine.next(i, decision, prior_held);

        let ret = bar_return(prior_held, bar.open, bar.close)
            * cost_multiplier(cost_rate, prior_held, held);

        ledger.accrue(ret)?;
        ledger.transition(bar, held);
        daily_return += ret;

        if ret != 0.0 {
            tracing::trace!(bar = bar.index, position = prior_held, ret, "bar return");
            bar_returns.push(BarReturn {
                date: session.date(),
                bar: bar.index,
                open: bar.open,
                close: bar.close,
                position: prior_held,
                ret,
            });
        }

        held_path.push(held);
        prior_signal = sanitize_signal(decision.signal);
        prior_held = held;
    }

    let trades = ledger.finish(session.bar(session.last_position()));
    reconcile(session.date(), daily_return, &trades)?;

    Ok(DayResult {
        date: session.date(),
        daily_return,
        trades,
        bar_returns,
        held: held_path,
    })
}

/// Trade PnLs must sum to the day's return.
pub fn reconcile(date: NaiveDate, daily_return: f64, trades: &[Trade]) -> Result<(), BacktestError> {
    let trade_sum: f64 = trades.iter().map(|t| t.pnl).sum();
    let tolerance = RECONCILE_TOLERANCE * daily_return.abs().max(1.0);
    if (trade_sum - daily_return).abs() > tolerance {
        return Err(BacktestError::InvariantViolation {
            date,
            reason: format!("trade pnl sum {trade_sum} != daily return {daily_return}"),
        });
    }
    Ok(())
}
