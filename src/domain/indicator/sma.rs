//! Rolling simple moving average.
//!
//! SMA(n)[i] = mean(x[i-n+1..=i]). The first (n-1) bars are undefined, as is
//! any window containing an undefined value.

pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().all(|v| v.is_finite()) {
            out[i] = window.iter().sum::<f64>() / period as f64;
        }
    }
    out
}
