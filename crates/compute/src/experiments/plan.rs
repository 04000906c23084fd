use serde::{Deserialize, Serialize};

use crate::pipeline::generators::GeneratorSpec;

fn default_sample_size() -> usize {
    1500
}

/// Named datasets compared by [`compare_methods`](super::compare_methods).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    /// Rows drawn per dataset.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default)]
    pub datasets: Vec<DatasetPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPlan {
    pub name: String,
    pub generator: GeneratorSpec,
}

impl DatasetPlan {
    pub fn new(name: impl Into<String>, generator: GeneratorSpec) -> Self {
        Self {
            name: name.into(),
            generator,
        }
    }
}

impl ExperimentPlan {
    /// The four reference shapes: symmetric, skewed, heavy-tailed, multimodal.
    pub fn builtin(sample_size: usize) -> Self {
        Self {
            sample_size,
            datasets: vec![
                DatasetPlan::new("Gaussian", GeneratorSpec::gaussian(2)),
                DatasetPlan::new("Exponential", GeneratorSpec::exponential(vec![1.0, 1.5])),
                DatasetPlan::new("LogNormal", GeneratorSpec::lognormal(2, 0.0, 0.6)),
                DatasetPlan::new("Bimodal", GeneratorSpec::bimodal(2, 3.0)),
            ],
        }
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetPlan> {
        self.datasets.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

impl Default for ExperimentPlan {
    fn default() -> Self {
        Self::builtin(default_sample_size())
    }
}
