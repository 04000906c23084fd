//! Max-|z| scoring under an assumed (or estimated) per-feature center and scale.

use outlier_core::{Dataset, Scores};

use crate::algorithms::stats::SPREAD_EPSILON;

use super::Scorer;

/// Z-score scorer. Fields left as `None` are estimated from the dataset
/// being scored: the mean, and the population std plus a tiny epsilon.
///
/// Supplying them simulates a prior belief about the distribution, which
/// may be right or wrong.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZScoreScorer {
    pub assume_mean: Option<Vec<f64>>,
    pub assume_std: Option<Vec<f64>>,
}

impl ZScoreScorer {
    pub fn estimated() -> Self {
        Self::default()
    }

    pub fn assuming(mean: Vec<f64>, std: Vec<f64>) -> Self {
        Self {
            assume_mean: Some(mean),
            assume_std: Some(std),
        }
    }
}

impl Scorer for ZScoreScorer {
    fn name(&self) -> &str {
        "Z-Score"
    }

    fn score(&self, x: &Dataset) -> Scores {
        zscore_scores(x, self.assume_mean.as_deref(), self.assume_std.as_deref())
    }
}

/// Row score = `max_j |(x_ij - mean_j) / std_j|`.
///
/// The worst dimension decides, so one extreme feature is enough to flag a
/// row no matter how ordinary the others are.
pub fn zscore_scores(x: &Dataset, assume_mean: Option<&[f64]>, assume_std: Option<&[f64]>) -> Scores {
    let mean = match assume_mean {
        Some(m) => m.to_vec(),
        None => x.column_means(),
    };
    let std = match assume_std {
        Some(s) => s.to_vec(),
        None => x.column_stds().into_iter().map(|s| s + SPREAD_EPSILON).collect(),
    };

    Scores(
        x.rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&mean)
                    .zip(&std)
                    .map(|((v, m), s)| ((v - m) / s).abs())
                    .fold(0.0, f64::max)
            })
            .collect(),
    )
}
