//! Statistical primitives shared by the aggregators.
//!
//! Missing readings are NaN; every function here filters them
//! explicitly and degrades to a neutral value instead of failing.

use serde::{Deserialize, Serialize};

/// Minimum number of valid pairs for a meaningful correlation.
const MIN_CORRELATION_SAMPLES: usize = 10;

/// Mean of the non-NaN values, or None when none survive the filter.
pub fn valid_mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        if !value.is_nan() {
            sum += value;
            count += 1;
        }
    }
    if count > 0 {
        Some(sum / count as f64)
    } else {
        None
    }
}

/// Pearson product-moment correlation between two per-minute series.
///
/// Readings are paired by minute index and a pair survives only when
/// both readings are valid, so gaps in one series never pair a minute
/// with a different minute of the other. Fewer than 10 surviving pairs
/// yields 0 (insufficient sample, not an error), as does a constant
/// series (zero variance).
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let mut n = 0usize;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (&x, &y) in xs.iter().zip(ys.iter()) {
        if x.is_nan() || y.is_nan() {
            continue;
        }
        n += 1;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }

    if n < MIN_CORRELATION_SAMPLES {
        return 0.0;
    }

    let n = n as f64;
    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Least-squares line through a set of (x, y) points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn y_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a regression line through the valid (x, y) pairs. Returns None
/// with fewer than two valid pairs or when the x values carry no
/// variance.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    let valid: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .collect();
    if valid.len() < 2 {
        return None;
    }

    let n = valid.len() as f64;
    let x_mean = valid.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y_mean = valid.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, y) in &valid {
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean) * (x - x_mean);
    }

    if denominator == 0.0 {
        return None;
    }

    let slope = numerator / denominator;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}
