//! Performance metrics over the daily return series and trade log.
//!
//! Returns are summed, not compounded: the cumulative curve is the running
//! sum of daily returns. Statistics that cannot be computed (zero variance,
//! zero drawdown, no trades, no losing trades) are `None`, never 0.

use chrono::NaiveDate;
use std::fmt;

use super::backtest::DailyResult;
use super::ledger::Trade;

pub const TRADING_DAYS_PER_YEAR: f64 = 242.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days: usize,
    pub cumulative: Vec<f64>,
    pub total_return: Option<f64>,
    pub annualized_return: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub calmar_ratio: Option<f64>,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: Option<f64>,
    pub profit_loss_ratio: Option<f64>,
    pub avg_net_pnl: Option<f64>,
}

impl PerformanceReport {
    pub fn compute(daily: &[DailyResult], trades: &[Trade]) -> Self {
        let returns: Vec<f64> = daily.iter().map(|d| d.ret).collect();
        let cumulative = cumulative_returns(&returns);

        let annualized = annualized_return(&cumulative);
        let max_dd = max_drawdown(&cumulative);
        let stats = TradeStats::compute(trades);

        PerformanceReport {
            start_date: daily.first().map(|d| d.date),
            end_date: daily.last().map(|d| d.date),
            days: daily.len(),
            total_return: cumulative.last().copied(),
            annualized_return: annualized,
            sharpe_ratio: sharpe_ratio(&returns),
            max_drawdown: max_dd,
            calmar_ratio: calmar_ratio(annualized, max_dd),
            total_trades: trades.len(),
            trades_won: stats.won,
            trades_lost: stats.lost,
            win_rate: stats.win_rate,
            profit_loss_ratio: stats.profit_loss_ratio,
            avg_net_pnl: stats.avg_net_pnl,
            cumulative,
        }
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let range = match (self.start_date, self.end_date) {
            (Some(s), Some(e)) => format!("{} - {}", s.format("%Y%m%d"), e.format("%Y%m%d")),
            _ => "-".to_string(),
        };
        writeln!(f, "Annualized Return: {}", Pct(self.annualized_return))?;
        writeln!(f, "Sharpe Ratio:      {}", Num(self.sharpe_ratio))?;
        writeln!(f, "Calmar Ratio:      {}", Num(self.calmar_ratio))?;
        writeln!(f, "Max Drawdown:      {}", Pct(self.max_drawdown))?;
        writeln!(f, "Total Trades:      {}", self.total_trades)?;
        writeln!(f, "Win Rate:          {}", Pct(self.win_rate))?;
        writeln!(f, "P/L Ratio:         {}", Num(self.profit_loss_ratio))?;
        writeln!(f, "Avg Net PnL:       {}", Num(self.avg_net_pnl))?;
        write!(f, "Range:             {} ({} days)", range, self.days)
    }
}

/// Renders an optional statistic as a percentage, `NaN` when undefined.
struct Pct(Option<f64>);

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.2}%", v * 100.0),
            None => write!(f, "NaN"),
        }
    }
}

struct Num(Option<f64>);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.4}", v),
            None => write!(f, "NaN"),
        }
    }
}

pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(0.0, |acc, r| {
            *acc += r;
            Some(*acc)
        })
        .collect()
}

/// finalCum * 242 / days
pub fn annualized_return(cumulative: &[f64]) -> Option<f64> {
    let last = cumulative.last()?;
    Some(last * TRADING_DAYS_PER_YEAR / cumulative.len() as f64)
}

/// mean / sample stdev * sqrt(242)
pub fn sharpe_ratio(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();
    if stddev == 0.0 || !stddev.is_finite() {
        return None;
    }
    Some(mean / stddev * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Largest drop of the cumulative curve below its running maximum, as a
/// positive magnitude.
pub fn max_drawdown(cumulative: &[f64]) -> Option<f64> {
    let first = *cumulative.first()?;
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &c in cumulative {
        if c > peak {
            peak = c;
        }
        max_dd = max_dd.max(peak - c);
    }
    Some(max_dd)
}

pub fn calmar_ratio(annualized: Option<f64>, max_drawdown: Option<f64>) -> Option<f64> {
    match (annualized, max_drawdown) {
        (Some(a), Some(dd)) if dd != 0.0 => Some(a / dd),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub won: usize,
    pub lost: usize,
    pub win_rate: Option<f64>,
    pub profit_loss_ratio: Option<f64>,
    pub avg_net_pnl: Option<f64>,
}

impl TradeStats {
    pub fn compute(trades: &[Trade]) -> Self {
        let mut won = 0usize;
        let mut lost = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut net = 0.0_f64;

        for trade in trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                won += 1;
                total_wins += pnl;
            } else if pnl < 0.0 {
                lost += 1;
                total_losses += pnl;
            }
            net += pnl;
        }

        let total = trades.len();
        let win_rate = (total > 0).then(|| won as f64 / total as f64);
        let profit_loss_ratio = if won > 0 && lost > 0 {
            let avg_win = total_wins / won as f64;
            let avg_loss = total_losses / lost as f64;
            Some(avg_win.abs() / avg_loss.abs())
        } else {
            None
        };
        let avg_net_pnl = (total > 0).then(|| net / total as f64);

        TradeStats {
            won,
            lost,
            win_rate,
            profit_loss_ratio,
            avg_net_pnl,
        }
    }
}
