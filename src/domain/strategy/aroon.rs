//! Aroon trend strategy.
//!
//! Aroon up/down = (offset of the window high/low + 1) / n * 100, so a fresh
//! high reads 100. Long when up > upband and down < lowband, short on the
//! mirror condition; otherwise keep the current position.

use crate::domain::indicator::extremum::{rolling_argmax, rolling_argmin};
use crate::domain::session::Session;
use crate::domain::signal::{Decision, PositionPolicy, SignalContext, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct AroonParams {
    pub nday: usize,
    pub upband: f64,
    pub lowband: f64,
}

impl Default for AroonParams {
    fn default() -> Self {
        Self {
            nday: 25,
            upband: 70.0,
            lowband: 30.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Aroon {
    params: AroonParams,
    up: Vec<f64>,
    down: Vec<f64>,
}

impl Aroon {
    pub fn new(params: AroonParams) -> Self {
        Self {
            params,
            up: Vec::new(),
            down: Vec::new(),
        }
    }
}

fn scale(offsets: Vec<f64>, n: usize) -> Vec<f64> {
    offsets
        .into_iter()
        .map(|o| (o + 1.0) / n as f64 * 100.0)
        .collect()
}

impl SignalSource for Aroon {
    fn name(&self) -> String {
        format!("Aroon_{}", self.params.nday)
    }

    fn warmup_bars(&self) -> usize {
        self.params.nday
    }

    fn policy(&self) -> PositionPolicy {
        PositionPolicy::FlipFlop
    }

    fn prepare(&mut self, session: &Session) {
        let n = self.params.nday;
        self.up = scale(rolling_argmax(&session.highs(), n), n);
        self.down = scale(rolling_argmin(&session.lows(), n), n);
    }

    fn decide(&self, ctx: &SignalContext) -> Decision {
        let up = self.up[ctx.index];
        let down = self.down[ctx.index];
        let p = &self.params;

        if up > p.upband && down < p.lowband {
            Decision::target(1.0)
        } else if down > p.upband && up < p.lowband {
            Decision::target(-1.0)
        } else {
            Decision::neutral()
        }
    }
}
