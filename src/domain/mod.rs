//! Core domain types and logic.

pub mod session;
pub mod signal;
pub mod position;
pub mod ledger;
pub mod day_runner;
pub mod indicator;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
