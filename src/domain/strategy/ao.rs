//! Awesome oscillator: zero-line cross, saucer and twin-peaks signals.
//!
//! AO = SMA(mp, nday) - SMA(mp, mday) over the median price. Rules are
//! checked in order and the first that fires wins:
//! 1. AO crosses zero;
//! 2. saucer: three bars on one side of zero with a reversal dip/hump;
//! 3. twin peaks: a second trough above an earlier one below zero (buy),
//!    or a second crest below an earlier one above zero (sell), searched
//!    back at most `mday` bars without crossing zero.

use crate::domain::indicator::difference;
use crate::domain::indicator::sma::rolling_mean;
use crate::domain::session::Session;
use crate::domain::signal::{Decision, PositionPolicy, SignalContext, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct AoParams {
    pub nday: usize,
    pub mday: usize,
}

impl Default for AoParams {
    fn default() -> Self {
        Self { nday: 25, mday: 60 }
    }
}

#[derive(Debug, Clone)]
pub struct Ao {
    params: AoParams,
    ao: Vec<f64>,
}

impl Ao {
    pub fn new(params: AoParams) -> Self {
        Self {
            params,
            ao: Vec::new(),
        }
    }

    /// Search back from `i - 2` for the first local extremum on the same side
    /// of zero and compare it with the extremum at `i - 1`.
    fn twin_peak(&self, i: usize, below_zero: bool) -> bool {
        let ao = &self.ao;
        let start = i.saturating_sub(self.params.mday);
        let second = ao[i - 1];

        let mut k = i - 2;
        while k > start {
            let val = ao[k];
            if (below_zero && val >= 0.0) || (!below_zero && val <= 0.0) {
                break;
            }
            let (next, prev) = (ao[k + 1], ao[k - 1]);
            if below_zero && val < next && val < prev {
                return second > val;
            }
            if !below_zero && val > next && val > prev {
                return second < val;
            }
            k -= 1;
        }
        false
    }
}

impl SignalSource for Ao {
    fn name(&self) -> String {
        format!("AO_{}_{}", self.params.nday, self.params.mday)
    }

    fn warmup_bars(&self) -> usize {
        self.params.mday + 2
    }

    fn policy(&self) -> PositionPolicy {
        PositionPolicy::FlipFlop
    }

    fn prepare(&mut self, session: &Session) {
        let mp = session.median_prices();
        self.ao = difference(
            &rolling_mean(&mp, self.params.nday),
            &rolling_mean(&mp, self.params.mday),
        );
    }

    fn decide(&self, ctx: &SignalContext) -> Decision {
        let i = ctx.index;
        if i < 2 {
            return Decision::neutral();
        }
        let (cur, p1, p2) = (self.ao[i], self.ao[i - 1], self.ao[i - 2]);

        let mut buy = p1 < 0.0 && cur > 0.0;
        let mut sell = p1 > 0.0 && cur < 0.0;

        if !buy && !sell {
            buy = cur > 0.0 && p1 > 0.0 && p2 > 0.0 && cur > p1 && p1 < p2;
            sell = cur < 0.0 && p1 < 0.0 && p2 < 0.0 && cur < p1 && p1 > p2;
        }

        if !buy && !sell {
            if cur < 0.0 && cur > p1 && p1 < p2 {
                buy = self.twin_peak(i, true);
            }
            if cur > 0.0 && cur < p1 && p1 > p2 {
                sell = self.twin_peak(i, false);
            }
        }

        if buy {
            Decision::target(1.0)
        } else if sell {
            Decision::target(-1.0)
        } else {
            Decision::neutral()
        }
    }
}
