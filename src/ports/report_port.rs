//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::domain::metrics::PerformanceReport;

/// Port for persisting a finished backtest.
pub trait ReportPort {
    fn write(
        &self,
        name: &str,
        result: &BacktestResult,
        report: &PerformanceReport,
    ) -> Result<(), BacktestError>;
}
