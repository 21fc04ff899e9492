//! ADX trend-strength breakout.
//!
//! True range and directional movement are smoothed with a span-n EMA;
//! ADX is the span-n EMA of DX. Entries need close outside the MA band and
//! ADX above the threshold. A held position that breaches the opposite band
//! reverses when the trend is strong and goes flat otherwise.

use crate::domain::indicator::ema::ema_span;
use crate::domain::indicator::sma::rolling_mean;
use crate::domain::session::Session;
use crate::domain::signal::{Decision, PositionPolicy, SignalContext, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct AdxParams {
    pub n: usize,
    pub threshold: f64,
    pub trend: usize,
    /// Half-width of the band around the trend MA, as a fraction.
    pub band: f64,
}

impl Default for AdxParams {
    fn default() -> Self {
        Self {
            n: 14,
            threshold: 30.0,
            trend: 60,
            band: 0.0005,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Adx {
    params: AdxParams,
    close: Vec<f64>,
    ma: Vec<f64>,
    adx: Vec<f64>,
}

impl Adx {
    pub fn new(params: AdxParams) -> Self {
        Self {
            params,
            close: Vec::new(),
            ma: Vec::new(),
            adx: Vec::new(),
        }
    }
}

/// ADX series for a session.
pub fn compute_adx(session: &Session, n: usize) -> Vec<f64> {
    let bars = session.bars();
    let len = bars.len();
    let mut tr = Vec::with_capacity(len);
    let mut plus_dm = Vec::with_capacity(len);
    let mut minus_dm = Vec::with_capacity(len);

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            tr.push(bar.high - bar.low);
            plus_dm.push(0.0);
            minus_dm.push(0.0);
            continue;
        }
        let prev = &bars[i - 1];
        tr.push(bar.true_range(prev.close));

        let hd = bar.high - prev.high;
        let ld = prev.low - bar.low;
        plus_dm.push(if hd > 0.0 && hd > ld { hd } else { 0.0 });
        minus_dm.push(if ld > 0.0 && ld > hd { ld } else { 0.0 });
    }

    let mtr = ema_span(&tr, n);
    let dmp = ema_span(&plus_dm, n);
    let dmm = ema_span(&minus_dm, n);

    let dx: Vec<f64> = (0..len)
        .map(|i| {
            let pdi = dmp[i] / mtr[i] * 100.0;
            let mdi = dmm[i] / mtr[i] * 100.0;
            let dx = (pdi - mdi).abs() / (pdi + mdi) * 100.0;
            if dx.is_finite() { dx } else { 0.0 }
        })
        .collect();

    ema_span(&dx, n)
}

impl SignalSource for Adx {
    fn name(&self) -> String {
        format!("ADX_{}", self.params.n)
    }

    fn warmup_bars(&self) -> usize {
        self.params.n
    }

    fn policy(&self) -> PositionPolicy {
        PositionPolicy::Direct
    }

    fn prepare(&mut self, session: &Session) {
        self.close = session.closes();
        self.ma = rolling_mean(&self.close, self.params.trend);
        self.adx = compute_adx(session, self.params.n);
    }

    fn decide(&self, ctx: &SignalContext) -> Decision {
        let i = ctx.index;
        let close = self.close[i];
        let upper = self.ma[i] * (1.0 + self.params.band);
        let lower = self.ma[i] * (1.0 - self.params.band);
        let strong = self.adx[i] > self.params.threshold;
        let held = ctx.prior_held;

        let target = if held == 0.0 {
            if close > upper && strong {
                1.0
            } else if close < lower && strong {
                -1.0
            } else {
                0.0
            }
        } else if held > 0.0 && close < lower {
            if strong { -1.0 } else { 0.0 }
        } else if held < 0.0 && close > upper {
            if strong { 1.0 } else { 0.0 }
        } else {
            held
        };
        Decision::target(target)
    }
}
