//! Ordinary least squares fit of a short series against its bar number.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Fit `y = slope * x + intercept` with x = 1..=n. Returns `None` for fewer
/// than two points or any non-finite value.
///
/// A constant series is fitted exactly, so its R² is 1.
pub fn linear_fit(ys: &[f64]) -> Option<LinearFit> {
    if ys.len() < 2 || !ys.iter().all(|y| y.is_finite()) {
        return None;
    }

    let n = ys.len() as f64;
    let mean_x = (n + 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (k, &y) in ys.iter().enumerate() {
        let dx = (k + 1) as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (k, &y) in ys.iter().enumerate() {
        let fitted = slope * (k + 1) as f64 + intercept;
        ss_res += (y - fitted).powi(2);
        ss_tot += (y - mean_y).powi(2);
    }

    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}
