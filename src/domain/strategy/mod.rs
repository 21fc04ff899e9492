//! Built-in signal sources.
//!
//! Each strategy computes its indicator arrays once per session in
//! `prepare` and answers bar-by-bar queries from them. [`StrategyKind`]
//! carries a strategy's parameters and builds a fresh source per session.

pub mod ac;
pub mod adx;
pub mod alligator;
pub mod ao;
pub mod aroon;
pub mod bollinger;
pub mod regression;

use chrono::NaiveDate;

use super::signal::SignalSource;
use ac::{Ac, AcParams};
use adx::{Adx, AdxParams};
use alligator::{Alligator, AlligatorParams};
use ao::{Ao, AoParams};
use aroon::{Aroon, AroonParams};
use bollinger::{Bollinger, BollingerParams};
use regression::{Regression, RegressionParams};

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    Aroon(AroonParams),
    Bollinger(BollingerParams),
    Alligator(AlligatorParams),
    Ac(AcParams),
    Adx(AdxParams),
    Ao(AoParams),
    Regression(RegressionParams),
}

impl StrategyKind {
    /// Config keyword for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::Aroon(_) => "aroon",
            StrategyKind::Bollinger(_) => "bollinger",
            StrategyKind::Alligator(_) => "alligator",
            StrategyKind::Ac(_) => "ac",
            StrategyKind::Adx(_) => "adx",
            StrategyKind::Ao(_) => "ao",
            StrategyKind::Regression(_) => "regression",
        }
    }

    pub fn build(&self) -> Box<dyn SignalSource + Send> {
        match self {
            StrategyKind::Aroon(p) => Box::new(Aroon::new(p.clone())),
            StrategyKind::Bollinger(p) => Box::new(Bollinger::new(p.clone())),
            StrategyKind::Alligator(p) => Box::new(Alligator::new(p.clone())),
            StrategyKind::Ac(p) => Box::new(Ac::new(p.clone())),
            StrategyKind::Adx(p) => Box::new(Adx::new(p.clone())),
            StrategyKind::Ao(p) => Box::new(Ao::new(p.clone())),
            StrategyKind::Regression(p) => Box::new(Regression::new(p.clone())),
        }
    }
}

/// A configured strategy: what to run and from when.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    /// Earliest session the strategy is meant to trade.
    pub min_date: Option<NaiveDate>,
    pub kind: StrategyKind,
}

impl Strategy {
    /// Strategy named after its symbol and kind, e.g. `IM_aroon`.
    pub fn new(symbol: &str, kind: StrategyKind) -> Self {
        Self {
            name: format!("{}_{}", symbol, kind.label()),
            min_date: None,
            kind,
        }
    }

    pub fn build(&self) -> Box<dyn SignalSource + Send> {
        self.kind.build()
    }
}
