//! CSV file data adapter.
//!
//! One file per symbol and trading day, named `{SYMBOL}_{YYYYMMDD}.csv`,
//! with a header row and columns `index, open, close, high, low`. The
//! trading-day calendar is a CSV of date keys, read from the
//! `TradingDayInt` column when present and the first column otherwise.

use crate::domain::error::BacktestError;
use crate::domain::session::{date_key, parse_date_key, Bar, Session};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const TRADING_DAY_COLUMN: &str = "TradingDayInt";

pub struct CsvAdapter {
    base_path: PathBuf,
    trading_days_path: Option<PathBuf>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            trading_days_path: None,
        }
    }

    pub fn with_trading_days(mut self, path: PathBuf) -> Self {
        self.trading_days_path = Some(path);
        self
    }

    fn csv_path(&self, symbol: &str, date: NaiveDate) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol, date_key(date)))
    }

    fn session_files(&self) -> Result<Vec<(String, NaiveDate)>, BacktestError> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            let Some(stem) = name.strip_suffix(".csv") else {
                continue;
            };
            let Some((symbol, key)) = stem.rsplit_once('_') else {
                continue;
            };
            if let Some(date) = parse_date_key(key) {
                found.push((symbol.to_string(), date));
            }
        }
        Ok(found)
    }

    fn read_calendar(&self, path: &Path) -> Result<Vec<NaiveDate>, BacktestError> {
        let calendar_error = |reason: String| BacktestError::ConfigInvalid {
            section: "data".into(),
            key: "trading_days".into(),
            reason,
        };

        let mut rdr = csv::Reader::from_path(path)
            .map_err(|e| calendar_error(format!("failed to read {}: {}", path.display(), e)))?;
        let column = rdr
            .headers()
            .map_err(|e| calendar_error(format!("CSV parse error: {}", e)))?
            .iter()
            .position(|h| h.trim() == TRADING_DAY_COLUMN)
            .unwrap_or(0);

        let mut days = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| calendar_error(format!("CSV parse error: {}", e)))?;
            let raw = record.get(column).unwrap_or("").trim();
            // Keys written from a float column come through as "20230103.0".
            let key = raw.strip_suffix(".0").unwrap_or(raw);
            let date = parse_date_key(key)
                .ok_or_else(|| calendar_error(format!("invalid trading day '{}'", raw)))?;
            days.push(date);
        }
        days.sort();
        days.dedup();
        Ok(days)
    }
}

fn parse_field(
    record: &csv::StringRecord,
    i: usize,
    name: &str,
) -> Result<f64, String> {
    let raw = record
        .get(i)
        .ok_or_else(|| format!("missing {} column", name))?;
    raw.trim()
        .parse()
        .map_err(|e| format!("invalid {} value '{}': {}", name, raw, e))
}

fn parse_index(record: &csv::StringRecord) -> Result<usize, String> {
    let raw = record.get(0).ok_or("missing index column")?.trim();
    if let Ok(i) = raw.parse::<usize>() {
        return Ok(i);
    }
    match raw.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
        _ => Err(format!("invalid bar index '{}'", raw)),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_session(&self, symbol: &str, date: NaiveDate) -> Result<Session, BacktestError> {
        let path = self.csv_path(symbol, date);
        let content = fs::read_to_string(&path).map_err(|e| BacktestError::MissingSessionData {
            symbol: symbol.to_string(),
            date,
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let malformed = |reason: String| BacktestError::MalformedSession {
            symbol: symbol.to_string(),
            date,
            reason,
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| malformed(format!("CSV parse error: {}", e)))?;
            let at_row = |reason: String| malformed(format!("row {}: {}", row + 1, reason));

            bars.push(Bar {
                index: parse_index(&record).map_err(at_row)?,
                open: parse_field(&record, 1, "open").map_err(at_row)?,
                close: parse_field(&record, 2, "close").map_err(at_row)?,
                high: parse_field(&record, 3, "high").map_err(at_row)?,
                low: parse_field(&record, 4, "low").map_err(at_row)?,
            });
        }

        tracing::debug!(symbol, %date, bars = bars.len(), "loaded session");
        Session::new(symbol, date, bars)
    }

    fn trading_days(&self) -> Result<Vec<NaiveDate>, BacktestError> {
        if let Some(path) = &self.trading_days_path {
            return self.read_calendar(path);
        }
        let mut days: Vec<NaiveDate> = self.session_files()?.into_iter().map(|(_, d)| d).collect();
        days.sort();
        days.dedup();
        Ok(days)
    }

    fn list_sessions(&self, symbol: &str) -> Result<Vec<NaiveDate>, BacktestError> {
        let mut days: Vec<NaiveDate> = self
            .session_files()?
            .into_iter()
            .filter(|(s, _)| s == symbol)
            .map(|(_, d)| d)
            .collect();
        days.sort();
        Ok(days)
    }
}
