//! Every scorer against every dataset shape, plus ROC curves on one shape.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use outlier_core::{Dataset, Result};

use crate::pipeline::evaluate::{roc_curve, EvaluationResult, RocCurve};
use crate::pipeline::generators::generate;
use crate::pipeline::scoring::ScoringMethod;
use crate::pipeline::Pipeline;

use super::plan::ExperimentPlan;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetResults {
    pub name: String,
    pub results: BTreeMap<ScoringMethod, EvaluationResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub quantile: f64,
    /// In plan order.
    pub datasets: Vec<DatasetResults>,
}

impl ComparisonReport {
    pub fn get(&self, dataset: &str, method: ScoringMethod) -> Option<&EvaluationResult> {
        self.datasets
            .iter()
            .find(|d| d.name == dataset)
            .and_then(|d| d.results.get(&method))
    }

    /// F1 per method, one entry per dataset in plan order.
    pub fn f1_summary(&self) -> BTreeMap<ScoringMethod, Vec<f64>> {
        let mut summary: BTreeMap<ScoringMethod, Vec<f64>> = BTreeMap::new();
        for d in &self.datasets {
            for (method, r) in &d.results {
                summary.entry(*method).or_default().push(r.f1);
            }
        }
        summary
    }

    /// Method with the highest F1 on each dataset.
    pub fn best_by_f1(&self) -> Vec<(&str, ScoringMethod)> {
        self.datasets
            .iter()
            .filter_map(|d| {
                d.results
                    .iter()
                    .max_by(|a, b| a.1.f1.total_cmp(&b.1.f1))
                    .map(|(m, _)| (d.name.as_str(), *m))
            })
            .collect()
    }
}

/// Draw every dataset of `plan`, in plan order, before any experiment runs.
pub fn generate_plan<R: Rng + ?Sized>(
    plan: &ExperimentPlan,
    rng: &mut R,
) -> Result<Vec<(String, Dataset)>> {
    let mut out = Vec::with_capacity(plan.datasets.len());
    for d in &plan.datasets {
        out.push((d.name.clone(), generate(&d.generator, plan.sample_size, rng)?));
    }
    Ok(out)
}

/// Run one experiment per dataset and collect dataset → method → result.
pub fn compare_methods<R: Rng + ?Sized>(
    datasets: &[(String, Dataset)],
    pipeline: &mut Pipeline,
    rng: &mut R,
) -> Result<ComparisonReport> {
    let mut rows = Vec::with_capacity(datasets.len());
    for (name, x) in datasets {
        info!(dataset = %name, rows = x.n_rows(), "comparing methods");
        let run = pipeline.run_one_experiment(x, name, rng)?;
        rows.push(DatasetResults {
            name: name.clone(),
            results: run.results,
        });
    }

    Ok(ComparisonReport {
        generated_at: Utc::now(),
        quantile: pipeline.quantile(),
        datasets: rows,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct RocReport {
    pub generated_at: DateTime<Utc>,
    pub name: String,
    pub curves: BTreeMap<ScoringMethod, RocCurve>,
    pub results: BTreeMap<ScoringMethod, EvaluationResult>,
}

/// Re-inject `x` and trace one ROC curve per scorer.
pub fn roc_demo<R: Rng + ?Sized>(
    x: &Dataset,
    name: &str,
    pipeline: &mut Pipeline,
    rng: &mut R,
) -> Result<RocReport> {
    let label = format!("{} (ROC demo)", name);
    let run = pipeline.run_one_experiment(x, &label, rng)?;

    let mut curves = BTreeMap::new();
    for (method, scores) in &run.scores {
        match roc_curve(scores, &run.labels) {
            Some(curve) => {
                curves.insert(*method, curve);
            }
            None => warn!(dataset = %label, method = %method, "single-class labels, no ROC curve"),
        }
    }

    Ok(RocReport {
        generated_at: Utc::now(),
        name: label,
        curves,
        results: run.results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlier_core::LabConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pipeline() -> Pipeline {
        let mut config = LabConfig::default();
        config.forest.n_estimators = 30;
        Pipeline::new(&config)
    }

    #[test]
    fn one_row_per_dataset_in_plan_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let plan = ExperimentPlan::builtin(400);
        let datasets = generate_plan(&plan, &mut rng).unwrap();
        let report = compare_methods(&datasets, &mut pipeline(), &mut rng).unwrap();

        let names: Vec<&str> = report.datasets.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Gaussian", "Exponential", "LogNormal", "Bimodal"]);
        for d in &report.datasets {
            assert_eq!(d.results.len(), 3);
        }

        let summary = report.f1_summary();
        assert_eq!(summary.len(), 3);
        assert!(summary.values().all(|f1s| f1s.len() == 4));
        assert_eq!(report.best_by_f1().len(), 4);
        assert!(report.get("Bimodal", ScoringMethod::Iqr).is_some());
    }

    #[test]
    fn roc_demo_has_a_curve_per_method() {
        let mut rng = StdRng::seed_from_u64(5);
        let plan = ExperimentPlan::builtin(300);
        let datasets = generate_plan(&plan, &mut rng).unwrap();
        let (name, x) = &datasets[1];
        let report = roc_demo(x, name, &mut pipeline(), &mut rng).unwrap();

        assert_eq!(report.name, "Exponential (ROC demo)");
        assert_eq!(report.curves.len(), 3);
        for (method, curve) in &report.curves {
            assert!((curve.auc - report.results[method].roc_auc).abs() < 1e-12);
            assert!(curve.auc > 0.5);
        }
    }

    #[test]
    fn report_serializes_with_method_keys() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = ExperimentPlan::builtin(100);
        let datasets = generate_plan(&plan, &mut rng).unwrap();
        let report = compare_methods(&datasets[..1], &mut pipeline(), &mut rng).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let results = &json["datasets"][0]["results"];
        assert!(results["Z-Score"]["f1"].is_number());
        assert!(results["IQR"].is_object());
        assert!(json["generated_at"].is_string());
    }
}
