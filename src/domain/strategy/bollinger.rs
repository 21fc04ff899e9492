//! Bollinger band mean reversion.
//!
//! Upper band: SMA(mday) + nstd * STDDEV(mday); lower band: SMA(nday) -
//! nstd * STDDEV(nday), both over closes with sample deviation. Short above
//! the upper band, long below the lower band, otherwise hold.

use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::stddev::rolling_std;
use crate::domain::session::Session;
use crate::domain::signal::{Decision, PositionPolicy, SignalContext, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerParams {
    pub mday: usize,
    pub nday: usize,
    pub nstd: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            mday: 15,
            nday: 21,
            nstd: 2.125,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    params: BollingerParams,
    close: Vec<f64>,
    upper: Vec<f64>,
    lower: Vec<f64>,
}

impl Bollinger {
    pub fn new(params: BollingerParams) -> Self {
        Self {
            params,
            close: Vec::new(),
            upper: Vec::new(),
            lower: Vec::new(),
        }
    }
}

fn band(close: &[f64], period: usize, mult: f64) -> Vec<f64> {
    rolling_mean(close, period)
        .into_iter()
        .zip(rolling_std(close, period))
        .map(|(m, sd)| m + mult * sd)
        .collect()
}

impl SignalSource for Bollinger {
    fn name(&self) -> String {
        let p = &self.params;
        format!("Bollinger_{}_{}_{}", p.mday, p.nday, p.nstd)
    }

    fn warmup_bars(&self) -> usize {
        self.params.mday.max(self.params.nday)
    }

    fn policy(&self) -> PositionPolicy {
        PositionPolicy::FlipFlop
    }

    fn prepare(&mut self, session: &Session) {
        self.close = session.closes();
        self.upper = band(&self.close, self.params.mday, self.params.nstd);
        self.lower = band(&self.close, self.params.nday, -self.params.nstd);
    }

    fn decide(&self, ctx: &SignalContext) -> Decision {
        let i = ctx.index;
        let close = self.close[i];

        if close > self.upper[i] {
            Decision::target(-1.0)
        } else if close < self.lower[i] {
            Decision::target(1.0)
        } else {
            Decision::neutral()
        }
    }
}
