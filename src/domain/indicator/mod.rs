//! Vectorized indicator helpers over a session's price arrays.
//!
//! Every helper returns one value per input bar. Bars where the indicator is
//! not yet defined hold `NaN`, so comparisons against them are false and a
//! signal derived from them is neutral.

pub mod ema;
pub mod extremum;
pub mod regression;
pub mod sma;
pub mod stddev;

/// Shift a series right by `k` bars, filling the head with `NaN`.
pub fn lag(values: &[f64], k: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| if i >= k { values[i - k] } else { f64::NAN })
        .collect()
}

/// Element-wise `a - b`.
pub fn difference(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}
