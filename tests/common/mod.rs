#![allow(dead_code)]

use chrono::NaiveDate;
use minutebt::domain::error::BacktestError;
use minutebt::domain::session::{Bar, Session};
use minutebt::domain::signal::{Decision, PositionPolicy, SignalContext, SignalSource};
use minutebt::ports::data_port::DataPort;
use std::collections::{BTreeMap, HashMap};

pub const SYMBOL: &str = "IM";

/// In-memory sessions keyed by date. Dates in `errors` fail as malformed;
/// calendar days with no stored session fail as missing.
pub struct MockDataPort {
    pub sessions: BTreeMap<NaiveDate, Vec<Bar>>,
    pub errors: HashMap<NaiveDate, String>,
    pub calendar: Vec<NaiveDate>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
            errors: HashMap::new(),
            calendar: Vec::new(),
        }
    }

    pub fn with_bars(mut self, date: NaiveDate, bars: Vec<Bar>) -> Self {
        self.calendar.push(date);
        self.sessions.insert(date, bars);
        self
    }

    pub fn with_prices(self, date: NaiveDate, prices: &[(f64, f64)]) -> Self {
        self.with_bars(date, bars(prices))
    }

    pub fn with_error(mut self, date: NaiveDate, reason: &str) -> Self {
        self.calendar.push(date);
        self.errors.insert(date, reason.to_string());
        self
    }

    /// A calendar day with no stored session.
    pub fn with_gap(mut self, date: NaiveDate) -> Self {
        self.calendar.push(date);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_session(&self, symbol: &str, date: NaiveDate) -> Result<Session, BacktestError> {
        if let Some(reason) = self.errors.get(&date) {
            return Err(BacktestError::MalformedSession {
                symbol: symbol.to_string(),
                date,
                reason: reason.clone(),
            });
        }
        match self.sessions.get(&date) {
            Some(bars) => Session::new(symbol, date, bars.clone()),
            None => Err(BacktestError::MissingSessionData {
                symbol: symbol.to_string(),
                date,
                reason: "not stored".into(),
            }),
        }
    }

    fn trading_days(&self) -> Result<Vec<NaiveDate>, BacktestError> {
        let mut days = self.calendar.clone();
        days.sort();
        Ok(days)
    }

    fn list_sessions(&self, _symbol: &str) -> Result<Vec<NaiveDate>, BacktestError> {
        Ok(self.sessions.keys().copied().collect())
    }
}

/// Replays a fixed signal list every session.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub signals: Vec<f64>,
    pub exits: Vec<bool>,
    pub warmup: usize,
    pub policy: PositionPolicy,
}

impl Scripted {
    pub fn new(signals: &[f64], policy: PositionPolicy, warmup: usize) -> Self {
        Self {
            signals: signals.to_vec(),
            exits: vec![false; signals.len()],
            warmup,
            policy,
        }
    }

    pub fn flip_flop(signals: &[f64]) -> Self {
        Self::new(signals, PositionPolicy::FlipFlop, 0)
    }
}

impl SignalSource for Scripted {
    fn name(&self) -> String {
        "scripted".into()
    }

    fn warmup_bars(&self) -> usize {
        self.warmup
    }

    fn policy(&self) -> PositionPolicy {
        self.policy
    }

    fn prepare(&mut self, _session: &Session) {}

    fn decide(&self, ctx: &SignalContext) -> Decision {
        let signal = self.signals.get(ctx.index).copied().unwrap_or(0.0);
        let exit = self.exits.get(ctx.index).copied().unwrap_or(false);
        Decision::target(signal).with_exit(exit)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn bar(index: usize, open: f64, close: f64) -> Bar {
    Bar {
        index,
        open,
        close,
        high: open.max(close) + 0.2,
        low: open.min(close) - 0.2,
    }
}

pub fn bars(prices: &[(f64, f64)]) -> Vec<Bar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &(open, close))| bar(i, open, close))
        .collect()
}

pub fn session(day: NaiveDate, prices: &[(f64, f64)]) -> Session {
    Session::new(SYMBOL, day, bars(prices)).unwrap()
}

/// The five-bar session used by the reversal scenario.
pub fn five_bar_prices() -> Vec<(f64, f64)> {
    vec![
        (100.0, 101.0),
        (101.0, 102.0),
        (102.0, 100.0),
        (100.0, 99.0),
        (99.0, 98.0),
    ]
}

/// Deterministic gently oscillating path; each bar opens at the previous close.
pub fn generate_prices(count: usize, start_price: f64, seed: u64) -> Vec<(f64, f64)> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut price = start_price;
    (0..count)
        .map(|i| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let noise = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            let drift = (i as f64 / 15.0).sin() * 0.2;
            let open = price;
            price = (price + drift + noise).max(1.0);
            (open, price)
        })
        .collect()
}
