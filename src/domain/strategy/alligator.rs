//! Alligator trend strategy.
//!
//! Lips, teeth and jaw are smoothed moving averages (alpha = 1/n) of the
//! median price. Long while close > lips > teeth > jaw, short while the
//! order is fully reversed, flat otherwise.

use crate::domain::indicator::ema::smma;
use crate::domain::session::Session;
use crate::domain::signal::{Decision, PositionPolicy, SignalContext, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct AlligatorParams {
    pub fast: usize,
    pub mid: usize,
    pub slow: usize,
}

impl Default for AlligatorParams {
    fn default() -> Self {
        Self {
            fast: 20,
            mid: 60,
            slow: 120,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Alligator {
    params: AlligatorParams,
    close: Vec<f64>,
    lips: Vec<f64>,
    teeth: Vec<f64>,
    jaw: Vec<f64>,
}

impl Alligator {
    pub fn new(params: AlligatorParams) -> Self {
        Self {
            params,
            close: Vec::new(),
            lips: Vec::new(),
            teeth: Vec::new(),
            jaw: Vec::new(),
        }
    }
}

impl SignalSource for Alligator {
    fn name(&self) -> String {
        let p = &self.params;
        format!("Alligator_{}_{}_{}", p.fast, p.mid, p.slow)
    }

    fn warmup_bars(&self) -> usize {
        self.params.slow
    }

    fn policy(&self) -> PositionPolicy {
        PositionPolicy::Direct
    }

    fn prepare(&mut self, session: &Session) {
        let mp = session.median_prices();
        self.close = session.closes();
        self.lips = smma(&mp, self.params.fast);
        self.teeth = smma(&mp, self.params.mid);
        self.jaw = smma(&mp, self.params.slow);
    }

    fn decide(&self, ctx: &SignalContext) -> Decision {
        let i = ctx.index;
        let (price, l, t, j) = (self.close[i], self.lips[i], self.teeth[i], self.jaw[i]);

        if price > l && l > t && t > j {
            Decision::target(1.0)
        } else if price < l && l < t && t < j {
            Decision::target(-1.0)
        } else {
            Decision::neutral()
        }
    }
}
