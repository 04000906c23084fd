//! Generate, diagnose, inject, detect, evaluate: the structured workflow.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use outlier_core::{Dataset, LabError, Result};

use crate::algorithms::stats::shape_moments;
use crate::pipeline::evaluate::{predict, EvaluationResult};
use crate::pipeline::generators::{generate, GeneratorSpec};
use crate::pipeline::scoring::ScoringMethod;
use crate::pipeline::Pipeline;

pub const WORKFLOW_SAMPLE_SIZE: usize = 1200;

/// Mean |skewness| below which a sample still looks Gaussian.
const GAUSSIAN_SKEW_LIMIT: f64 = 0.5;
/// Mean |excess kurtosis| below which a sample still looks Gaussian.
const GAUSSIAN_KURTOSIS_LIMIT: f64 = 1.0;

/// Which detector the workflow should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detector {
    Z,
    Iqr,
    IsolationForest,
    /// Isolation forest; the shape diagnostics are reported but not consulted.
    Auto,
    /// Z-score when the clean sample looks Gaussian, isolation forest otherwise.
    Shape,
}

impl Detector {
    pub fn resolve(self, shape: &ShapeDiagnostics) -> ScoringMethod {
        match self {
            Detector::Z => ScoringMethod::ZScore,
            Detector::Iqr => ScoringMethod::Iqr,
            Detector::IsolationForest | Detector::Auto => ScoringMethod::IsolationForest,
            Detector::Shape if shape.looks_gaussian() => ScoringMethod::ZScore,
            Detector::Shape => ScoringMethod::IsolationForest,
        }
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Detector::Z => "z",
            Detector::Iqr => "iqr",
            Detector::IsolationForest => "iforest",
            Detector::Auto => "auto",
            Detector::Shape => "shape",
        };
        f.write_str(s)
    }
}

impl FromStr for Detector {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "z" | "zscore" | "z-score" => Ok(Detector::Z),
            "iqr" => Ok(Detector::Iqr),
            "iforest" | "isolation-forest" => Ok(Detector::IsolationForest),
            "auto" => Ok(Detector::Auto),
            "shape" => Ok(Detector::Shape),
            other => Err(LabError::InvalidParameter(format!("unknown detector '{}'", other))),
        }
    }
}

/// Per-feature skewness and excess kurtosis of the clean sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeDiagnostics {
    pub skewness: Vec<f64>,
    pub excess_kurtosis: Vec<f64>,
}

impl ShapeDiagnostics {
    pub fn mean_abs_skew(&self) -> f64 {
        mean_abs(&self.skewness)
    }

    pub fn mean_abs_kurtosis(&self) -> f64 {
        mean_abs(&self.excess_kurtosis)
    }

    pub fn looks_gaussian(&self) -> bool {
        self.mean_abs_skew() < GAUSSIAN_SKEW_LIMIT
            && self.mean_abs_kurtosis() < GAUSSIAN_KURTOSIS_LIMIT
    }
}

fn mean_abs(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
}

pub fn check_distribution_shape(x: &Dataset) -> ShapeDiagnostics {
    let (skewness, excess_kurtosis): (Vec<f64>, Vec<f64>) = (0..x.dim())
        .map(|j| shape_moments(&x.column(j)))
        .unzip();
    ShapeDiagnostics {
        skewness,
        excess_kurtosis,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub generated_at: DateTime<Utc>,
    pub label: String,
    pub requested: Detector,
    pub detector: ScoringMethod,
    pub diagnostics: ShapeDiagnostics,
    pub quantile: f64,
    pub result: EvaluationResult,
    /// Rows of the injected dataset scored at or above the threshold.
    pub flagged: Vec<usize>,
}

/// Run the workflow on `n` rows drawn from `spec`.
pub fn run_workflow<R: Rng + ?Sized>(
    spec: &GeneratorSpec,
    label: &str,
    detector: Detector,
    n: usize,
    pipeline: &mut Pipeline,
    rng: &mut R,
) -> Result<WorkflowReport> {
    let x = generate(spec, n, rng)?;
    let diagnostics = check_distribution_shape(&x);

    let (x2, y) = pipeline.inject(&x, rng)?;

    let method = detector.resolve(&diagnostics);
    let scores = pipeline.score(method, &x2);
    let result = pipeline.evaluate_scores(&scores, &y, &format!("{} | {}", label, method));
    let flagged = predict(&scores, result.threshold)
        .iter()
        .enumerate()
        .filter(|(_, &p)| p == 1)
        .map(|(i, _)| i)
        .collect();

    info!(
        "{} | feature skewness (mean over dims): {:.2}",
        label,
        diagnostics.mean_abs_skew()
    );
    info!(
        "{} | feature excess kurtosis (mean over dims): {:.2}",
        label,
        diagnostics.mean_abs_kurtosis()
    );
    pipeline.metrics.record_experiment();

    Ok(WorkflowReport {
        generated_at: Utc::now(),
        label: label.to_string(),
        requested: detector,
        detector: method,
        diagnostics,
        quantile: pipeline.quantile(),
        result,
        flagged,
    })
}
