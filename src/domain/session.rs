//! Intraday bars and trading sessions.
//!
//! A [`Session`] is one trading day's bar sequence for one symbol. It is
//! validated on construction and immutable afterwards.

use chrono::{Datelike, NaiveDate};

use super::error::BacktestError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub index: usize,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

impl Bar {
    /// (high + low) / 2
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Mean of open, close, high and low.
    pub fn mean_price(&self) -> f64 {
        (self.open + self.close + self.high + self.low) / 4.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    symbol: String,
    date: NaiveDate,
    bars: Vec<Bar>,
}

impl Session {
    /// Build a session, rejecting empty or non-positive price data. Bar
    /// indices must run 0, 1, 2, ... so that a bar's index is its position.
    pub fn new(symbol: &str, date: NaiveDate, bars: Vec<Bar>) -> Result<Self, BacktestError> {
        let malformed = |reason: String| BacktestError::MalformedSession {
            symbol: symbol.to_string(),
            date,
            reason,
        };

        if bars.is_empty() {
            return Err(malformed("session has no bars".into()));
        }

        for (pos, bar) in bars.iter().enumerate() {
            if bar.index != pos {
                return Err(malformed(format!(
                    "bar index {} at position {}, expected {}",
                    bar.index, pos, pos
                )));
            }
            if !(bar.open.is_finite() && bar.open > 0.0) {
                return Err(malformed(format!(
                    "bar {} has invalid open price {}",
                    bar.index, bar.open
                )));
            }
            if !(bar.close.is_finite() && bar.close > 0.0) {
                return Err(malformed(format!(
                    "bar {} has invalid close price {}",
                    bar.index, bar.close
                )));
            }
            if !bar.high.is_finite() || !bar.low.is_finite() {
                return Err(malformed(format!("bar {} has non-finite high/low", bar.index)));
            }
        }

        Ok(Self {
            symbol: symbol.to_string(),
            date,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, i: usize) -> &Bar {
        &self.bars[i]
    }

    pub fn last_position(&self) -> usize {
        self.bars.len() - 1
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn median_prices(&self) -> Vec<f64> {
        self.bars.iter().map(Bar::median_price).collect()
    }

    pub fn mean_prices(&self) -> Vec<f64> {
        self.bars.iter().map(Bar::mean_price).collect()
    }
}

/// Parse an integer date key of the form YYYYMMDD.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let key = key.trim();
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(key, "%Y%m%d").ok()
}

/// Inverse of [`parse_date_key`].
pub fn date_key(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}
