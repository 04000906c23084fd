//! Isolation forest: anomalies are the points that random axis-aligned
//! splits isolate in few steps.
//!
//! Each tree is grown on a subsample drawn without replacement, splitting on
//! a random non-constant feature at a uniform threshold until the node is a
//! singleton or the height limit `ceil(log2(sample_size))` is reached. A
//! point's path length is its depth plus the expected depth `c(size)` of the
//! unbuilt subtree below the leaf it lands in.
//!
//! `score_samples` follows the common convention: values near `-1` are
//! anomalous, values near `-0.5` and above are normal.

use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use outlier_core::{Dataset, LabError, Result};

use super::stats::quantile;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Offset applied in `decision_function` when contamination is automatic.
const AUTO_OFFSET: f64 = -0.5;

/// How the decision offset is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Contamination {
    /// Fixed offset of -0.5, the point where the normalized path length equals `c(n)`.
    #[default]
    Auto,
    /// Offset at this quantile of the training scores; must lie in (0, 0.5].
    Ratio(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForestParams {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub contamination: Contamination,
    pub seed: u64,
}

impl Default for IsolationForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: Contamination::Auto,
            seed: 42,
        }
    }
}

impl From<&outlier_core::ForestConfig> for IsolationForestParams {
    fn from(c: &outlier_core::ForestConfig) -> Self {
        Self {
            n_estimators: c.n_estimators,
            max_samples: c.max_samples,
            contamination: Contamination::Auto,
            seed: c.seed,
        }
    }
}

impl IsolationForestParams {
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_samples(mut self, n: usize) -> Self {
        self.max_samples = n;
        self
    }

    pub fn with_contamination(mut self, c: Contamination) -> Self {
        self.contamination = c;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Grow the forest on `x`.
    pub fn fit(&self, x: &Dataset) -> Result<IsolationForest> {
        if x.is_empty() || x.dim() == 0 {
            return Err(LabError::InvalidParameter(
                "isolation forest needs at least one row and one feature".into(),
            ));
        }
        if self.n_estimators == 0 {
            return Err(LabError::InvalidParameter("n_estimators must be >= 1".into()));
        }
        if let Contamination::Ratio(c) = self.contamination {
            if !(c > 0.0 && c <= 0.5) {
                return Err(LabError::InvalidParameter(format!(
                    "contamination must be in (0, 0.5], got {}",
                    c
                )));
            }
        }

        let n = x.n_rows();
        let sample_size = self.max_samples.clamp(1, n);
        let max_height = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let trees: Vec<IsolationTree> = (0..self.n_estimators)
            .map(|_| {
                let indices = index::sample(&mut rng, n, sample_size).into_vec();
                IsolationTree::build(x.rows(), indices, 0, max_height, &mut rng)
            })
            .collect();

        let mut forest = IsolationForest {
            trees,
            sample_size,
            offset: AUTO_OFFSET,
        };

        if let Contamination::Ratio(c) = self.contamination {
            forest.offset = quantile(&forest.score_samples(x), c);
        }

        debug!(
            trees = forest.trees.len(),
            sample_size,
            max_height,
            offset = forest.offset,
            "isolation forest fitted"
        );
        Ok(forest)
    }
}

#[derive(Debug, Clone)]
enum IsolationTree {
    Internal {
        feature: usize,
        threshold: f64,
        left: Box<IsolationTree>,
        right: Box<IsolationTree>,
    },
    External {
        size: usize,
    },
}

impl IsolationTree {
    fn build(
        rows: &[Vec<f64>],
        indices: Vec<usize>,
        height: usize,
        max_height: usize,
        rng: &mut StdRng,
    ) -> Self {
        let size = indices.len();
        if height >= max_height || size <= 1 {
            return IsolationTree::External { size };
        }

        // Random feature among those that still vary inside this node with a finite span.
        let dim = rows[indices[0]].len();
        let mut features: Vec<usize> = (0..dim).collect();
        features.shuffle(rng);
        let split = features.into_iter().find_map(|f| {
            let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(rows[i][f]), hi.max(rows[i][f]))
            });
            (hi > lo && (hi - lo).is_finite()).then_some((f, lo, hi))
        });
        let Some((feature, lo, hi)) = split else {
            return IsolationTree::External { size };
        };

        let threshold = rng.gen_range(lo..hi);
        let (left, right): (Vec<usize>, Vec<usize>) =
            indices.into_iter().partition(|&i| rows[i][feature] < threshold);

        if left.is_empty() || right.is_empty() {
            return IsolationTree::External { size };
        }

        IsolationTree::Internal {
            feature,
            threshold,
            left: Box::new(Self::build(rows, left, height + 1, max_height, rng)),
            right: Box::new(Self::build(rows, right, height + 1, max_height, rng)),
        }
    }

    fn path_length(&self, sample: &[f64]) -> f64 {
        let mut node = self;
        let mut depth = 0usize;
        loop {
            match node {
                IsolationTree::External { size } => {
                    return depth as f64 + average_path_length(*size);
                }
                IsolationTree::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] < *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                    depth += 1;
                }
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` points:
/// `c(n) = 2·H(n-1) - 2(n-1)/n`.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// A fitted forest.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    offset: f64,
}

impl IsolationForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Normality score per row: `-2^(-E[h(x)] / c(sample_size))`.
    /// Lower is more anomalous.
    pub fn score_samples(&self, x: &Dataset) -> Vec<f64> {
        let norm = average_path_length(self.sample_size).max(1.0);
        x.rows()
            .iter()
            .map(|row| {
                let mean_path = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>()
                    / self.trees.len() as f64;
                -(2.0_f64.powf(-mean_path / norm))
            })
            .collect()
    }

    /// `score_samples - offset`; negative values are outliers.
    pub fn decision_function(&self, x: &Dataset) -> Vec<f64> {
        self.score_samples(x)
            .into_iter()
            .map(|s| s - self.offset)
            .collect()
    }

    /// 1 for outliers, 0 for inliers.
    pub fn predict(&self, x: &Dataset) -> Vec<u8> {
        self.decision_function(x)
            .into_iter()
            .map(|d| u8::from(d < 0.0))
            .collect()
    }
}
