//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for minutebt.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("no data for {symbol} on {date}: {reason}")]
    MissingSessionData {
        symbol: String,
        date: NaiveDate,
        reason: String,
    },

    #[error("malformed session {symbol} on {date}: {reason}")]
    MalformedSession {
        symbol: String,
        date: NaiveDate,
        reason: String,
    },

    #[error("invariant violated on {date}: {reason}")]
    InvariantViolation { date: NaiveDate, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    /// Per-session failures that skip the date rather than abort the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BacktestError::MissingSessionData { .. } | BacktestError::MalformedSession { .. }
        )
    }

    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        BacktestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        BacktestError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) | BacktestError::Report { .. } => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::MissingSessionData { .. } | BacktestError::MalformedSession { .. } => 5,
            BacktestError::InvariantViolation { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
