//! Tukey-fence scoring.

use outlier_core::{Dataset, Scores};

use crate::algorithms::stats::{quantile, SPREAD_EPSILON};

use super::Scorer;

/// Fence multiplier applied to the interquartile range.
pub const TUKEY_K: f64 = 1.5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IqrScorer;

impl Scorer for IqrScorer {
    fn name(&self) -> &str {
        "IQR"
    }

    fn score(&self, x: &Dataset) -> Scores {
        iqr_scores(x)
    }
}

/// Per-feature Tukey fences `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fence {
    pub lower: f64,
    pub upper: f64,
    /// `Q3 - Q1` plus epsilon; never zero.
    pub iqr: f64,
}

impl Fence {
    pub fn from_values(values: &[f64]) -> Self {
        let q1 = quantile(values, 0.25);
        let q3 = quantile(values, 0.75);
        let iqr = (q3 - q1) + SPREAD_EPSILON;
        Self {
            lower: q1 - TUKEY_K * iqr,
            upper: q3 + TUKEY_K * iqr,
            iqr,
        }
    }

    /// Distance past the nearer fence in IQR units; 0 inside the fences.
    pub fn violation(&self, v: f64) -> f64 {
        let below = (self.lower - v) / self.iqr;
        let above = (v - self.upper) / self.iqr;
        below.max(above).max(0.0)
    }
}

/// Row score = largest fence violation across features.
pub fn iqr_scores(x: &Dataset) -> Scores {
    let fences: Vec<Fence> = (0..x.dim()).map(|j| Fence::from_values(&x.column(j))).collect();

    Scores(
        x.rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&fences)
                    .map(|(&v, fence)| fence.violation(v))
                    .fold(0.0, f64::max)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_from_quartiles() {
        // Q1 = 2, Q3 = 4 with linear interpolation over 1..=5.
        let f = Fence::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((f.lower - (-1.0)).abs() < 1e-9);
        assert!((f.upper - 7.0).abs() < 1e-9);
        assert_eq!(f.violation(3.0), 0.0);
        assert!((f.violation(11.0) - 2.0).abs() < 1e-9);
        assert!((f.violation(-3.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn inliers_score_zero() {
        let x = Dataset::from_rows((0..20).map(|i| vec![i as f64, (i % 5) as f64]).collect()).unwrap();
        let s = IqrScorer.score(&x);
        assert!(s.0.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn far_point_scores_highest() {
        let mut rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (i % 5) as f64]).collect();
        rows.push(vec![5.0, 100.0]);
        let x = Dataset::from_rows(rows).unwrap();
        let s = IqrScorer.score(&x);
        assert_eq!(s.ranking()[0], 20);
        assert!(s.0[20] > 0.0);
    }

    #[test]
    fn constant_feature_stays_finite() {
        let mut rows: Vec<Vec<f64>> = (0..10).map(|i| vec![1.0, i as f64]).collect();
        rows.push(vec![1.0, 50.0]);
        let x = Dataset::from_rows(rows).unwrap();
        let s = IqrScorer.score(&x);
        assert!(s.all_finite());
    }
}
