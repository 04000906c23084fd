//! Z-scoring a correlated Gaussian with wrong versus estimated parameters.

use rand::Rng;
use serde::Serialize;
use tracing::info;

use outlier_core::{Dataset, Result, Scores};

use crate::algorithms::stats::SPREAD_EPSILON;
use crate::pipeline::evaluate::{predict, threshold_by_quantile};
use crate::pipeline::generators::gaussian;
use crate::pipeline::scoring::zscore_scores;

pub const ASSUMPTION_SAMPLE_SIZE: usize = 600;
pub const ASSUMPTION_COV: [[f64; 2]; 2] = [[1.0, 0.8], [0.8, 1.2]];
pub const WRONG_MEAN: [f64; 2] = [2.0, -1.5];
pub const WRONG_STD: [f64; 2] = [0.5, 0.5];

/// Rows flagged by one z-score detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagSummary {
    pub assume_mean: Vec<f64>,
    pub assume_std: Vec<f64>,
    pub threshold: f64,
    pub flagged: Vec<usize>,
}

impl FlagSummary {
    fn new(scores: &Scores, quantile: f64, assume_mean: Vec<f64>, assume_std: Vec<f64>) -> Self {
        let threshold = threshold_by_quantile(scores, quantile);
        let flagged = predict(scores, threshold)
            .iter()
            .enumerate()
            .filter(|(_, &p)| p == 1)
            .map(|(i, _)| i)
            .collect();
        Self {
            assume_mean,
            assume_std,
            threshold,
            flagged,
        }
    }

    pub fn count(&self) -> usize {
        self.flagged.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssumptionReport {
    pub quantile: f64,
    #[serde(skip)]
    pub dataset: Dataset,
    pub wrong: FlagSummary,
    pub estimated: FlagSummary,
}

/// Score one correlated Gaussian sample under a shifted, too-narrow model and
/// under parameters estimated from the sample itself.
///
/// With a quantile threshold both detectors flag the same number of rows;
/// what differs is which rows they pick.
pub fn assumption_mismatch<R: Rng + ?Sized>(quantile: f64, rng: &mut R) -> Result<AssumptionReport> {
    let cov: Vec<Vec<f64>> = ASSUMPTION_COV.iter().map(|r| r.to_vec()).collect();
    let x = gaussian(ASSUMPTION_SAMPLE_SIZE, 2, Some(&[0.0, 0.0][..]), Some(cov.as_slice()), rng)?;

    let wrong_scores = zscore_scores(&x, Some(&WRONG_MEAN[..]), Some(&WRONG_STD[..]));
    let wrong = FlagSummary::new(&wrong_scores, quantile, WRONG_MEAN.to_vec(), WRONG_STD.to_vec());

    let est_mean = x.column_means();
    let est_std: Vec<f64> = x.column_stds().iter().map(|s| s + SPREAD_EPSILON).collect();
    let right_scores = zscore_scores(&x, Some(est_mean.as_slice()), Some(est_std.as_slice()));
    let estimated = FlagSummary::new(&right_scores, quantile, est_mean, est_std);

    info!(
        wrong = wrong.count(),
        estimated = estimated.count(),
        "assumption mismatch: flagged rows"
    );

    Ok(AssumptionReport {
        quantile,
        dataset: x,
        wrong,
        estimated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn wrong_model_flags_different_rows() {
        let mut rng = StdRng::seed_from_u64(42);
        let report = assumption_mismatch(0.95, &mut rng).unwrap();
        assert_eq!(report.dataset.n_rows(), 600);
        // 95th percentile of 600 continuous scores leaves 30 rows at or above it.
        assert_eq!(report.wrong.count(), 30);
        assert_eq!(report.estimated.count(), 30);
        assert_ne!(report.wrong.flagged, report.estimated.flagged);

        // The shifted model is worst around (-2, 1.5), far from its own mean.
        let x = &report.dataset;
        let mean_x0: f64 = report
            .wrong
            .flagged
            .iter()
            .map(|&i| x.row(i)[0])
            .sum::<f64>()
            / report.wrong.count() as f64;
        assert!(mean_x0 < 0.0);
    }

    #[test]
    fn estimated_parameters_match_sample() {
        let mut rng = StdRng::seed_from_u64(7);
        let report = assumption_mismatch(0.9, &mut rng).unwrap();
        assert!(report.estimated.assume_mean.iter().all(|m| m.abs() < 0.2));
        assert!((report.estimated.assume_std[0] - 1.0).abs() < 0.15);
    }
}
