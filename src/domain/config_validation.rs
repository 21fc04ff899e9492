//! Configuration validation.
//!
//! Checks every key the backtest reads before any session is loaded. The
//! config port falls back to defaults for unparseable numbers, so raw
//! strings are checked here instead.

use crate::domain::error::BacktestError;
use crate::domain::session::parse_date_key;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const STRATEGY_KINDS: [&str; 7] = [
    "aroon",
    "bollinger",
    "alligator",
    "ac",
    "adx",
    "ao",
    "regression",
];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_data(config)?;
    validate_dates(config)?;
    validate_cost_rate(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let kind = validate_kind(config)?;
    optional_date(config, "strategy", "min_date")?;
    match kind.as_str() {
        "aroon" => {
            period(config, "nday")?;
            let up = number(config, "strategy", "upband")?;
            let low = number(config, "strategy", "lowband")?;
            for (key, v) in [("upband", up), ("lowband", low)] {
                if let Some(v) = v {
                    if !(0.0..=100.0).contains(&v) {
                        return Err(BacktestError::invalid("strategy", key, "must be between 0 and 100"));
                    }
                }
            }
        }
        "bollinger" => {
            for key in ["mday", "nday"] {
                if let Some(n) = period(config, key)? {
                    if n < 2 {
                        return Err(BacktestError::invalid("strategy", key, "must be at least 2"));
                    }
                }
            }
            positive(config, "nstd")?;
        }
        "alligator" => {
            period(config, "fast")?;
            period(config, "mid")?;
            period(config, "slow")?;
        }
        "ac" => {
            period(config, "n1")?;
            period(config, "n2")?;
            period(config, "trend")?;
        }
        "adx" => {
            period(config, "n")?;
            period(config, "trend")?;
            non_negative(config, "threshold")?;
            non_negative(config, "band")?;
        }
        "ao" => {
            period(config, "nday")?;
            period(config, "mday")?;
        }
        "regression" => {
            if let Some(n) = period(config, "lookback")? {
                if n < 2 {
                    return Err(BacktestError::invalid("strategy", "lookback", "must be at least 2"));
                }
            }
            non_negative(config, "slope")?;
            non_negative(config, "jump")?;
            if let Some(r2) = number(config, "strategy", "r2")? {
                if !(0.0..1.0).contains(&r2) {
                    return Err(BacktestError::invalid("strategy", "r2", "must be in [0, 1)"));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    if config.get_string("data", "path").is_none() {
        return Err(BacktestError::missing("data", "path"));
    }
    if let Some(n) = integer(config, "data", "session_bars")? {
        if n < 0 {
            return Err(BacktestError::invalid(
                "data",
                "session_bars",
                "session_bars must be non-negative",
            ));
        }
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let start = optional_date(config, "backtest", "start_date")?;
    let end = optional_date(config, "backtest", "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(BacktestError::invalid(
                "backtest",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }
    Ok(())
}

fn validate_cost_rate(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    if let Some(rate) = number(config, "backtest", "cost_rate")? {
        if !(0.0..1.0).contains(&rate) {
            return Err(BacktestError::invalid(
                "backtest",
                "cost_rate",
                "cost_rate must be in [0, 1)",
            ));
        }
    }
    Ok(())
}

fn validate_kind(config: &dyn ConfigPort) -> Result<String, BacktestError> {
    let kind = config
        .get_string("strategy", "kind")
        .ok_or_else(|| BacktestError::missing("strategy", "kind"))?
        .to_lowercase();
    if !STRATEGY_KINDS.contains(&kind.as_str()) {
        return Err(BacktestError::invalid(
            "strategy",
            "kind",
            format!("unknown kind '{kind}', expected one of {}", STRATEGY_KINDS.join(", ")),
        ));
    }
    Ok(kind)
}

/// Parse an optional YYYYMMDD date key.
pub fn optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, BacktestError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => parse_date_key(&s)
            .map(Some)
            .ok_or_else(|| BacktestError::invalid(section, key, "invalid date, expected YYYYMMDD")),
    }
}

fn number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, BacktestError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(BacktestError::invalid(section, key, format!("'{s}' is not a number"))),
        },
    }
}

fn integer(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, BacktestError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| BacktestError::invalid(section, key, format!("'{s}' is not an integer"))),
    }
}

fn period(config: &dyn ConfigPort, key: &str) -> Result<Option<i64>, BacktestError> {
    let value = integer(config, "strategy", key)?;
    if let Some(n) = value {
        if n < 1 {
            return Err(BacktestError::invalid("strategy", key, "must be at least 1"));
        }
    }
    Ok(value)
}

fn positive(config: &dyn ConfigPort, key: &str) -> Result<(), BacktestError> {
    match number(config, "strategy", key)? {
        Some(v) if v <= 0.0 => Err(BacktestError::invalid("strategy", key, "must be positive")),
        _ => Ok(()),
    }
}

fn non_negative(config: &dyn ConfigPort, key: &str) -> Result<(), BacktestError> {
    match number(config, "strategy", key)? {
        Some(v) if v < 0.0 => Err(BacktestError::invalid("strategy", key, "must be non-negative")),
        _ => Ok(()),
    }
}
