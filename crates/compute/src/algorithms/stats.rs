//! Order statistics and distribution-shape moments.
//!
//! Quantiles interpolate linearly between order statistics (index `q·(n-1)`),
//! matching the usual "linear" percentile definition.

/// Additive guard applied to spreads before dividing by them.
pub const SPREAD_EPSILON: f64 = 1e-12;

/// Empirical `q`-quantile with linear interpolation.
///
/// `q` is clamped to `[0, 1]`. Returns NaN for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// Same as [`quantile`] for data that is already sorted ascending.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let q = if q.is_nan() { 0.0 } else { q.clamp(0.0, 1.0) };
    let index = q * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper || upper >= sorted.len() {
        sorted[lower.min(sorted.len() - 1)]
    } else {
        let fraction = index - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Skewness and excess kurtosis of one feature from standardized moments.
///
/// The spread is guarded with [`SPREAD_EPSILON`], so a constant feature
/// reports `(0, -3)` instead of NaN.
pub fn shape_moments(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let m = mean(values);
    let s = std_dev(values) + SPREAD_EPSILON;
    let n = values.len() as f64;

    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for v in values {
        let z = (v - m) / s;
        let z2 = z * z;
        m3 += z2 * z;
        m4 += z2 * z2;
    }
    (m3 / n, m4 / n - 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates() {
        let v = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 1.0), 4.0);
        // index = 0.5 * 3 = 1.5 -> halfway between 2 and 3
        assert!((quantile(&v, 0.5) - 2.5).abs() < 1e-12);
        // index = 0.25 * 3 = 0.75
        assert!((quantile(&v, 0.25) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn quantile_clamps_and_handles_edges() {
        assert!(quantile(&[], 0.5).is_nan());
        assert_eq!(quantile(&[7.0], 0.3), 7.0);
        assert_eq!(quantile(&[1.0, 2.0], 1.5), 2.0);
        assert_eq!(quantile(&[1.0, 2.0], -1.0), 1.0);
    }

    #[test]
    fn std_dev_is_population() {
        let v = vec![1.0, 3.0];
        assert!((std_dev(&v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_data_has_no_skew() {
        let v = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        let (skew, _) = shape_moments(&v);
        assert!(skew.abs() < 1e-12);
    }

    #[test]
    fn right_tail_is_positive_skew() {
        let v = vec![0.0, 0.0, 0.0, 0.0, 10.0];
        let (skew, kurt) = shape_moments(&v);
        assert!(skew > 1.0);
        assert!(kurt > 0.0);
    }

    #[test]
    fn constant_feature_is_finite() {
        let (skew, kurt) = shape_moments(&[3.0; 10]);
        assert_eq!(skew, 0.0);
        assert_eq!(kurt, -3.0);
    }
}
