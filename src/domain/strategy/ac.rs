//! Accelerator oscillator strategy with a forced exit.
//!
//! AO = SMA(mp, n1) - SMA(mp, n2), AC = AO - SMA(AO, n1). A long is dropped
//! as soon as AC ticks below its previous value (a short when it ticks
//! above), then entries are re-evaluated on the same bar:
//! - buy: AC > 0 and two rising bars, or AC < 0 and three rising bars,
//!   with close above SMA(close, trend);
//! - sell: the mirror image with close below the trend average.

use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::{difference, lag};
use crate::domain::session::Session;
use crate::domain::signal::{Decision, PositionPolicy, SignalContext, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct AcParams {
    pub n1: usize,
    pub n2: usize,
    pub trend: usize,
}

impl Default for AcParams {
    fn default() -> Self {
        Self {
            n1: 35,
            n2: 135,
            trend: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ac {
    params: AcParams,
    close: Vec<f64>,
    trend_ma: Vec<f64>,
    ac: Vec<f64>,
    p1: Vec<f64>,
    p2: Vec<f64>,
    p3: Vec<f64>,
}

impl Ac {
    pub fn new(params: AcParams) -> Self {
        Self {
            params,
            close: Vec::new(),
            trend_ma: Vec::new(),
            ac: Vec::new(),
            p1: Vec::new(),
            p2: Vec::new(),
            p3: Vec::new(),
        }
    }

    fn buy(&self, i: usize) -> bool {
        let (ac, p1, p2, p3) = (self.ac[i], self.p1[i], self.p2[i], self.p3[i]);
        let rising2 = ac > p1 && p1 > p2;
        let zone = (ac > 0.0 && rising2) || (ac < 0.0 && rising2 && p2 > p3);
        zone && self.close[i] > self.trend_ma[i]
    }

    fn sell(&self, i: usize) -> bool {
        let (ac, p1, p2, p3) = (self.ac[i], self.p1[i], self.p2[i], self.p3[i]);
        let falling2 = ac < p1 && p1 < p2;
        let zone = (ac < 0.0 && falling2) || (ac > 0.0 && falling2 && p2 < p3);
        zone && self.close[i] < self.trend_ma[i]
    }
}

impl SignalSource for Ac {
    fn name(&self) -> String {
        format!("AC_{}_{}", self.params.n1, self.params.n2)
    }

    fn warmup_bars(&self) -> usize {
        self.params.n2.max(self.params.trend)
    }

    fn policy(&self) -> PositionPolicy {
        PositionPolicy::ForcedExit
    }

    fn prepare(&mut self, session: &Session) {
        let mp = session.median_prices();
        let ao = difference(
            &rolling_mean(&mp, self.params.n1),
            &rolling_mean(&mp, self.params.n2),
        );
        let ac = difference(&ao, &rolling_mean(&ao, self.params.n1));

        self.close = session.closes();
        self.trend_ma = rolling_mean(&self.close, self.params.trend);
        self.p1 = lag(&ac, 1);
        self.p2 = lag(&ac, 2);
        self.p3 = lag(&ac, 3);
        self.ac = ac;
    }

    fn decide(&self, ctx: &SignalContext) -> Decision {
        let i = ctx.index;
        let exit = (ctx.prior_held > 0.0 && self.ac[i] < self.p1[i])
            || (ctx.prior_held < 0.0 && self.ac[i] > self.p1[i]);

        let decision = if self.buy(i) {
            Decision::target(1.0)
        } else if self.sell(i) {
            Decision::target(-1.0)
        } else {
            Decision::neutral()
        };
        decision.with_exit(exit)
    }
}
