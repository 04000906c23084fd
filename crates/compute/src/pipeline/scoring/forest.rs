//! Isolation-forest scoring, inverted so that higher means more anomalous.

use tracing::warn;

use outlier_core::{Dataset, Scores};

use crate::algorithms::isolation_forest::IsolationForestParams;

use super::Scorer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsolationForestScorer {
    pub params: IsolationForestParams,
}

impl IsolationForestScorer {
    pub fn new(params: IsolationForestParams) -> Self {
        Self { params }
    }
}

impl Scorer for IsolationForestScorer {
    fn name(&self) -> &str {
        "IsolationForest"
    }

    fn score(&self, x: &Dataset) -> Scores {
        isolation_forest_scores(x, &self.params)
    }
}

/// Fit a forest on `x` and return `-score_samples(x)`.
///
/// A dataset the forest cannot be fitted on (no rows or no features) scores
/// every row 0.
pub fn isolation_forest_scores(x: &Dataset, params: &IsolationForestParams) -> Scores {
    match params.fit(x) {
        Ok(forest) => Scores(forest.score_samples(x).into_iter().map(|s| -s).collect()),
        Err(e) => {
            warn!(error = %e, "isolation forest not fitted, scoring all rows 0");
            Scores(vec![0.0; x.n_rows()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_point_scores_highest() {
        let mut rows: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![(i % 6) as f64 * 0.1, (i / 6) as f64 * 0.1])
            .collect();
        rows.push(vec![25.0, -25.0]);
        let x = Dataset::from_rows(rows).unwrap();

        let s = IsolationForestScorer::default().score(&x);
        assert_eq!(s.len(), 61);
        assert_eq!(s.ranking()[0], 60);
        assert!(s.0.iter().all(|&v| v > 0.0 && v <= 1.0));
    }

    #[test]
    fn empty_dataset_scores_nothing() {
        let s = IsolationForestScorer::default().score(&Dataset::empty(2));
        assert!(s.is_empty());
    }
}
