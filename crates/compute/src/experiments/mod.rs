//! Experiment drivers built on top of the [`Pipeline`](crate::pipeline::Pipeline).
//!
//! Each driver draws from the caller's random stream in a fixed order, so a
//! fixed seed reproduces the whole report.

pub mod assumption;
pub mod comparison;
pub mod plan;
pub mod workflow;

pub use assumption::{assumption_mismatch, AssumptionReport, FlagSummary};
pub use comparison::{compare_methods, generate_plan, roc_demo, ComparisonReport, RocReport};
pub use plan::{DatasetPlan, ExperimentPlan};
pub use workflow::{check_distribution_shape, run_workflow, Detector, ShapeDiagnostics, WorkflowReport};
