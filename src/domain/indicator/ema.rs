//! Recursive exponential smoothing.
//!
//! y[0] = x[0], y[i] = alpha * x[i] + (1 - alpha) * y[i-1], with no warmup
//! bias correction. Leading undefined inputs are skipped; the recursion
//! seeds at the first defined value.

pub fn smoothed_average(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        let next = match (prev, x.is_finite()) {
            (None, true) => Some(x),
            (Some(p), true) => Some(alpha * x + (1.0 - alpha) * p),
            (p, false) => p,
        };
        out.push(match (next, x.is_finite()) {
            (Some(v), true) => v,
            _ => f64::NAN,
        });
        prev = next;
    }
    out
}

/// Smoothed moving average, alpha = 1/n.
pub fn smma(values: &[f64], period: usize) -> Vec<f64> {
    smoothed_average(values, 1.0 / period.max(1) as f64)
}

/// Span-parameterised EMA, alpha = 2/(n+1).
pub fn ema_span(values: &[f64], span: usize) -> Vec<f64> {
    smoothed_average(values, 2.0 / (span as f64 + 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_with_first_value() {
        let y = smoothed_average(&[10.0, 20.0, 30.0], 0.5);
        assert_eq!(y[0], 10.0);
        assert!((y[1] - 15.0).abs() < f64::EPSILON);
        assert!((y[2] - 22.5).abs() < f64::EPSILON);
    }

    #[test]
    fn span_alpha() {
        // span 3 → alpha 0.5
        let y = ema_span(&[10.0, 20.0, 30.0], 3);
        assert!((y[2] - 22.5).abs() < f64::EPSILON);
    }

    #[test]
    fn smma_alpha() {
        // period 4 → alpha 0.25: 0.25 * 20 + 0.75 * 10 = 12.5
        let y = smma(&[10.0, 20.0], 4);
        assert!((y[1] - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn leading_nan_skipped() {
        let y = smoothed_average(&[f64::NAN, 4.0, 8.0], 0.5);
        assert!(y[0].is_nan());
        assert_eq!(y[1], 4.0);
        assert!((y[2] - 6.0).abs() < f64::EPSILON);
    }
}
