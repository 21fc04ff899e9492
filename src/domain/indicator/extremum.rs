//! Rolling position of the window extremum.
//!
//! Returns the offset (0 = oldest bar in the window) of the first maximum or
//! minimum within each trailing window of n bars, as used by Aroon.

pub fn rolling_argmax(values: &[f64], period: usize) -> Vec<f64> {
    rolling_arg(values, period, |candidate, best| candidate > best)
}

pub fn rolling_argmin(values: &[f64], period: usize) -> Vec<f64> {
    rolling_arg(values, period, |candidate, best| candidate < best)
}

fn rolling_arg(values: &[f64], period: usize, better: impl Fn(f64, f64) -> bool) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if !window.iter().all(|v| v.is_finite()) {
            continue;
        }
        let mut best = 0;
        for (k, &v) in window.iter().enumerate().skip(1) {
            if better(v, window[best]) {
                best = k;
            }
        }
        out[i] = best as f64;
    }
    out
}
