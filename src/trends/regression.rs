//! Simple linear regression with a slope significance test
//!
//! Fits y against the ordinal index 0..n by least squares and reports the
//! slope, R-squared, and the two-sided p-value of the slope t-statistic.

use crate::stats::student_t_two_sided;

/// Result of an ordinary least squares fit of y against 0..n
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, in [0, 1]
    pub r_squared: f64,
    /// Standard error of the slope estimate
    pub slope_std_error: f64,
    /// Two-sided p-value of the slope t-test (df = n - 2)
    pub p_value: f64,
    /// Number of points fitted
    pub n: usize,
}

/// Fit a least-squares line through (0, y[0]), (1, y[1]), ...
///
/// Returns `None` for fewer than 2 points, where no slope is identifiable.
pub fn fit(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;

    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    // Residual sum of squares; guard against tiny negative values from
    // floating-point cancellation
    let sse = (syy - slope * sxy).max(0.0);
    let r_squared = if syy > 0.0 {
        (1.0 - sse / syy).clamp(0.0, 1.0)
    } else {
        // Constant series: the line explains nothing beyond the mean
        0.0
    };

    let (slope_std_error, p_value) = if n > 2 {
        let mse = sse / (nf - 2.0);
        let se = (mse / sxx).sqrt();
        if se > 0.0 {
            let t = slope / se;
            (se, student_t_two_sided(t, n - 2))
        } else {
            // Exact fit: infinitely significant unless the slope itself is zero
            (0.0, if slope == 0.0 { 1.0 } else { 0.0 })
        }
    } else {
        // Two points always fit exactly; no residual df for a test
        (0.0, 1.0)
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        slope_std_error,
        p_value,
        n,
    })
}
