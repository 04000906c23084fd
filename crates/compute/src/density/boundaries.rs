//! Outlier boundaries for one-dimensional data.
//!
//! The spread parameter of `outliers_as_function_of_variance` is used as a
//! standard deviation even though it is called a variance; the percentages
//! are reported against that value.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use outlier_core::{LabError, Result};

use crate::algorithms::stats::quantile;
use crate::pipeline::scoring::iqr::TUKEY_K;

use super::{linspace, normal_pdf_curve};

/// Closed interval outside of which a value counts as an outlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && v <= self.upper
    }
}

/// `mean ± k·std`.
pub fn std_bounds(mean: f64, std: f64, k: f64) -> Bounds {
    Bounds {
        lower: mean - k * std,
        upper: mean + k * std,
    }
}

/// Tukey fences `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]` without the epsilon guard
/// the scorer adds.
pub fn iqr_bounds(data: &[f64]) -> Bounds {
    let q1 = quantile(data, 0.25);
    let q3 = quantile(data, 0.75);
    let iqr = q3 - q1;
    Bounds {
        lower: q1 - TUKEY_K * iqr,
        upper: q3 + TUKEY_K * iqr,
    }
}

/// Number of values strictly outside `bounds` and the per-value mask.
pub fn count_outliers(data: &[f64], bounds: Bounds) -> (usize, Vec<bool>) {
    let mask: Vec<bool> = data.iter().map(|&v| !bounds.contains(v)).collect();
    let count = mask.iter().filter(|&&m| m).count();
    (count, mask)
}

/// `100 · count / total`, 0 for an empty sample.
pub fn outlier_percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariancePoint {
    pub std: f64,
    pub percentage: f64,
    /// Peak of the density curve at this spread.
    pub peak_density: f64,
}

/// Share of the grid `linspace(0, 100, size)` that falls outside
/// `mean ± 2·s` for `s = 1..=final_variance`.
pub fn outliers_as_function_of_variance(
    mean: f64,
    final_variance: u32,
    size: usize,
) -> Vec<VariancePoint> {
    let grid = linspace(0.0, 100.0, size);
    (1..=final_variance)
        .map(|s| {
            let std = f64::from(s);
            let curve = normal_pdf_curve(&grid, mean, std);
            let (count, _) = count_outliers(&grid, std_bounds(mean, std, 2.0));
            VariancePoint {
                std,
                percentage: outlier_percentage(count, grid.len()),
                peak_density: curve.iter().copied().fold(0.0, f64::max),
            }
        })
        .collect()
}

/// Outlier share under one boundary rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleOutcome {
    pub bounds: Bounds,
    pub count: usize,
    pub percentage: f64,
}

impl RuleOutcome {
    fn apply(data: &[f64], bounds: Bounds) -> Self {
        let (count, _) = count_outliers(data, bounds);
        Self {
            bounds,
            count,
            percentage: outlier_percentage(count, data.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryReport {
    pub mean: f64,
    pub std: f64,
    pub k: f64,
    /// `mean ± k·std` applied to the grid `linspace(0, 100, size)`.
    pub grid: RuleOutcome,
    /// `mean ± k·std` applied to `size` draws from `N(mean, std²)`.
    pub sample_std: RuleOutcome,
    /// Tukey fences applied to the same draws.
    pub sample_iqr: RuleOutcome,
    pub sweep: Vec<VariancePoint>,
}

/// Compare the std and IQR rules on a grid and on a sample, and sweep the
/// spread from 1 to `final_variance`.
pub fn summarize_boundaries<R: Rng + ?Sized>(
    mean: f64,
    std: f64,
    k: f64,
    size: usize,
    final_variance: u32,
    rng: &mut R,
) -> Result<BoundaryReport> {
    let dist = Normal::new(mean, std).map_err(|e| LabError::InvalidParameter(e.to_string()))?;
    let sample: Vec<f64> = dist.sample_iter(&mut *rng).take(size).collect();
    let grid = linspace(0.0, 100.0, size);
    let bounds = std_bounds(mean, std, k);

    Ok(BoundaryReport {
        mean,
        std,
        k,
        grid: RuleOutcome::apply(&grid, bounds),
        sample_std: RuleOutcome::apply(&sample, bounds),
        sample_iqr: RuleOutcome::apply(&sample, iqr_bounds(&sample)),
        sweep: outliers_as_function_of_variance(mean, final_variance, size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_bounds_are_symmetric() {
        let b = std_bounds(50.0, 10.0, 2.0);
        assert_eq!(b, Bounds { lower: 30.0, upper: 70.0 });
    }

    #[test]
    fn iqr_bounds_use_linear_quartiles() {
        // Q1 = 2, Q3 = 4, IQR = 2.
        let b = iqr_bounds(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(b, Bounds { lower: -1.0, upper: 7.0 });
    }

    #[test]
    fn boundary_values_are_not_outliers() {
        let (count, mask) = count_outliers(&[0.0, 1.0, 2.0, 3.0], Bounds { lower: 1.0, upper: 2.0 });
        assert_eq!(count, 2);
        assert_eq!(mask, vec![true, false, false, true]);
        assert_eq!(outlier_percentage(count, mask.len()), 50.0);
        assert_eq!(outlier_percentage(0, 0), 0.0);
    }

    #[test]
    fn percentage_shrinks_as_spread_grows() {
        let points = outliers_as_function_of_variance(50.0, 40, 1000);
        assert_eq!(points.len(), 40);
        assert_eq!(points[0].std, 1.0);
        assert!(points[0].percentage > 90.0);
        // mean ± 50 covers the whole grid.
        assert_eq!(points[24].percentage, 0.0);
        assert_eq!(points[39].percentage, 0.0);
        assert!(points.windows(2).all(|w| w[1].percentage <= w[0].percentage));
        assert!(points[0].peak_density > points[39].peak_density);
    }

    #[test]
    fn sample_rules_flag_a_few_percent() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(42);
        let report = summarize_boundaries(50.0, 10.0, 2.0, 1000, 40, &mut rng).unwrap();
        assert_eq!(report.grid.bounds, Bounds { lower: 30.0, upper: 70.0 });
        // Grid points outside [30, 70] out of 0..=100: roughly 60%.
        assert!((report.grid.percentage - 60.0).abs() < 1.0);
        // About 4.6% of a normal sample lies beyond 2σ, 0.7% beyond the fences.
        assert!((1.0..10.0).contains(&report.sample_std.percentage));
        assert!(report.sample_iqr.percentage < 3.0);
        assert_eq!(report.sweep.len(), 40);
    }

    #[test]
    fn non_positive_spread_is_rejected() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(1);
        assert!(summarize_boundaries(0.0, -1.0, 2.0, 10, 5, &mut rng).is_err());
    }
}
