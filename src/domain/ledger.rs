//! Trade reconstruction for one session.
//!
//! The ledger is either FLAT or OPEN with one trade. Every change of held
//! value closes the open trade (if any) and opens a new one (if the new value
//! is nonzero) at the same bar, priced at that bar's open. The session end
//! force-closes whatever is still open at the last bar's close.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::BacktestError;
use super::session::Bar;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub entry_bar: usize,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_bar: usize,
    pub exit_price: f64,
    pub size: f64,
    pub pnl: f64,
    pub forced_close: bool,
}

impl Trade {
    pub fn is_long(&self) -> bool {
        self.size > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.size < 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenTrade {
    pub entry_bar: usize,
    pub entry_price: f64,
    pub size: f64,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LedgerState {
    #[default]
    Flat,
    Open(OpenTrade),
}

impl LedgerState {
    /// Size of the open trade, 0 when flat.
    pub fn size(&self) -> f64 {
        match self {
            LedgerState::Flat => 0.0,
            LedgerState::Open(t) => t.size,
        }
    }
}

#[derive(Debug)]
pub struct TradeLedger {
    symbol: String,
    date: NaiveDate,
    state: LedgerState,
    completed: Vec<Trade>,
}

impl TradeLedger {
    pub fn new(symbol: &str, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            date,
            state: LedgerState::Flat,
            completed: Vec::new(),
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn trades(&self) -> &[Trade] {
        &self.completed
    }

    /// Attribute a bar's return to the trade open entering that bar.
    pub fn accrue(&mut self, ret: f64) -> Result<(), BacktestError> {
        match &mut self.state {
            LedgerState::Open(t) => {
                t.pnl += ret;
                Ok(())
            }
            LedgerState::Flat if ret == 0.0 => Ok(()),
            LedgerState::Flat => Err(BacktestError::InvariantViolation {
                date: self.date,
                reason: format!("return {ret} accrued while flat"),
            }),
        }
    }

    /// Apply the held position decided at `bar`.
    pub fn transition(&mut self, bar: &Bar, held: f64) {
        if held == self.state.size() {
            return;
        }

        if let LedgerState::Open(open) = std::mem::take(&mut self.state) {
            self.close(open, bar.index, bar.open, false);
        }

        if held != 0.0 {
            self.state = LedgerState::Open(OpenTrade {
                entry_bar: bar.index,
                entry_price: bar.open,
                size: held,
                pnl: 0.0,
            });
        }
    }

    /// Force-close any open trade at the last bar's close and hand back the
    /// session's completed trades.
    pub fn finish(mut self, last: &Bar) -> Vec<Trade> {
        if let LedgerState::Open(open) = std::mem::take(&mut self.state) {
            self.close(open, last.index, last.close, true);
        }
        self.completed
    }

    fn close(&mut self, open: OpenTrade, exit_bar: usize, exit_price: f64, forced: bool) {
        self.completed.push(Trade {
            symbol: self.symbol.clone(),
            entry_date: self.date,
            entry_bar: open.entry_bar,
            entry_price: open.entry_price,
            exit_date: self.date,
            exit_bar,
            exit_price,
            size: open.size,
            pnl: open.pnl,
            forced_close: forced,
        });
    }
}
