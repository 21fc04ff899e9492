//! Short-window regression fade.
//!
//! Fits a line through the `lookback` mean prices before bar i, normalized by
//! their mean. A clean trend (high R²) followed by a jump in the same
//! direction is faded, sized by R².

use crate::domain::indicator::regression::linear_fit;
use crate::domain::session::Session;
use crate::domain::signal::{Decision, PositionPolicy, SignalContext, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionParams {
    pub lookback: usize,
    /// Minimum absolute slope of the normalized fit.
    pub slope: f64,
    /// R² must exceed this.
    pub r2: f64,
    /// Minimum move of bar i relative to bar i - 1.
    pub jump: f64,
}

impl Default for RegressionParams {
    fn default() -> Self {
        Self {
            lookback: 5,
            slope: 0.0005,
            r2: 0.5,
            jump: 0.001,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Regression {
    params: RegressionParams,
    signals: Vec<f64>,
}

impl Regression {
    pub fn new(params: RegressionParams) -> Self {
        Self {
            params,
            signals: Vec::new(),
        }
    }

    fn signal_at(&self, x: &[f64], i: usize) -> f64 {
        let p = &self.params;
        if i < p.lookback {
            return 0.0;
        }
        let window = &x[i - p.lookback..i];
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let normalized: Vec<f64> = window.iter().map(|v| v / mean).collect();

        let Some(fit) = linear_fit(&normalized) else {
            return 0.0;
        };
        let cond = x[i] / x[i - 1] - 1.0;

        if fit.slope >= p.slope && fit.r_squared > p.r2 && cond > p.jump {
            -fit.r_squared
        } else if fit.slope <= -p.slope && fit.r_squared > p.r2 && cond <= -p.jump {
            fit.r_squared
        } else {
            0.0
        }
    }
}

impl SignalSource for Regression {
    fn name(&self) -> String {
        format!("Regression_{}", self.params.lookback)
    }

    fn warmup_bars(&self) -> usize {
        self.params.lookback + 1
    }

    fn policy(&self) -> PositionPolicy {
        PositionPolicy::Direct
    }

    fn prepare(&mut self, session: &Session) {
        let x = session.mean_prices();
        self.signals = (0..x.len()).map(|i| self.signal_at(&x, i)).collect();
    }

    fn decide(&self, ctx: &SignalContext) -> Decision {
        Decision::target(self.signals[ctx.index])
    }
}
