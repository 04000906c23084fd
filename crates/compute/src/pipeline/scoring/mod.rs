//! Interchangeable anomaly scorers.
//!
//! Every scorer maps a dataset to one score per row with the same
//! convention: higher means more anomalous.
//!
//! Sub-modules:
//! - [`zscore`]: max-|z| under assumed or estimated moments
//! - [`iqr`]: distance past Tukey fences
//! - [`forest`]: inverted isolation-forest normality

pub mod forest;
pub mod iqr;
pub mod zscore;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use outlier_core::{Dataset, LabError, Scores};

use crate::algorithms::isolation_forest::IsolationForestParams;

pub use forest::{isolation_forest_scores, IsolationForestScorer};
pub use iqr::{iqr_scores, Fence, IqrScorer};
pub use zscore::{zscore_scores, ZScoreScorer};

/// Anything that assigns an anomaly score to every row of a dataset.
pub trait Scorer {
    /// Display name used in reports.
    fn name(&self) -> &str;

    fn score(&self, x: &Dataset) -> Scores;
}

/// The three built-in scoring methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoringMethod {
    #[serde(rename = "Z-Score")]
    ZScore,
    #[serde(rename = "IQR")]
    Iqr,
    IsolationForest,
}

impl ScoringMethod {
    pub fn all() -> [ScoringMethod; 3] {
        [ScoringMethod::ZScore, ScoringMethod::Iqr, ScoringMethod::IsolationForest]
    }

    /// Scorer for this method; the z-score estimates its moments from the data.
    pub fn scorer(self, forest: &IsolationForestParams) -> Box<dyn Scorer> {
        match self {
            ScoringMethod::ZScore => Box::new(ZScoreScorer::estimated()),
            ScoringMethod::Iqr => Box::new(IqrScorer),
            ScoringMethod::IsolationForest => Box::new(IsolationForestScorer::new(forest.clone())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoringMethod::ZScore => "Z-Score",
            ScoringMethod::Iqr => "IQR",
            ScoringMethod::IsolationForest => "IsolationForest",
        }
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScoringMethod {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "z" | "zscore" | "z-score" => Ok(ScoringMethod::ZScore),
            "iqr" => Ok(ScoringMethod::Iqr),
            "iforest" | "isolationforest" | "isolation-forest" => Ok(ScoringMethod::IsolationForest),
            other => Err(LabError::InvalidParameter(format!("unknown scoring method '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_method_names() {
        assert_eq!("z".parse::<ScoringMethod>().unwrap(), ScoringMethod::ZScore);
        assert_eq!("IQR".parse::<ScoringMethod>().unwrap(), ScoringMethod::Iqr);
        assert_eq!(
            "isolation-forest".parse::<ScoringMethod>().unwrap(),
            ScoringMethod::IsolationForest
        );
        assert!("lof".parse::<ScoringMethod>().is_err());
    }

    #[test]
    fn scorer_names_match_labels() {
        let params = IsolationForestParams::default();
        for m in ScoringMethod::all() {
            assert_eq!(m.scorer(&params).name(), m.label());
        }
    }

    #[test]
    fn every_scorer_survives_constant_features() {
        let rows = (0..30).map(|i| vec![2.0, 2.0, i as f64]).collect();
        let x = Dataset::from_rows(rows).unwrap();
        let params = IsolationForestParams::default().with_n_estimators(20);
        for m in ScoringMethod::all() {
            let s = m.scorer(&params).score(&x);
            assert_eq!(s.len(), 30);
            assert!(s.all_finite(), "{} produced non-finite scores", m);
        }
    }
}
