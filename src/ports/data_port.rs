//! Price data access port trait.

use crate::domain::error::BacktestError;
use crate::domain::session::Session;
use chrono::NaiveDate;

pub trait DataPort {
    /// Load one symbol's bars for one trading day. A missing session is
    /// reported as [`BacktestError::MissingSessionData`].
    fn fetch_session(&self, symbol: &str, date: NaiveDate) -> Result<Session, BacktestError>;

    /// The ordered list of valid trading days.
    fn trading_days(&self) -> Result<Vec<NaiveDate>, BacktestError>;

    /// Days for which `symbol` has a stored session, ascending.
    fn list_sessions(&self, symbol: &str) -> Result<Vec<NaiveDate>, BacktestError>;
}
