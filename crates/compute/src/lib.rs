//! Outlier-detection experiments: synthetic data, scorers and evaluation.

pub mod algorithms;
pub mod density;
pub mod experiments;
pub mod pipeline;

pub use algorithms::isolation_forest::{Contamination, IsolationForest, IsolationForestParams};
pub use experiments::{
    assumption_mismatch, compare_methods, generate_plan, roc_demo, run_workflow, AssumptionReport,
    ComparisonReport, DatasetPlan, Detector, ExperimentPlan, RocReport, WorkflowReport,
};
pub use pipeline::evaluate::{evaluate, EvaluationResult, RocCurve};
pub use pipeline::generators::{generate, GeneratorSpec};
pub use pipeline::scoring::{Scorer, ScoringMethod};
pub use pipeline::{ExperimentRun, Pipeline};
