use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use outlier_compute::experiments::ExperimentPlan;
use outlier_compute::GeneratorSpec;
use outlier_core::LabConfig;

use crate::cli::GlobalArgs;

/// Apply command-line overrides on top of the environment config.
pub fn apply_overrides(config: &mut LabConfig, args: &GlobalArgs) -> Result<()> {
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(q) = args.quantile {
        if !(0.0..=1.0).contains(&q) {
            bail!("--quantile must be within [0, 1], got {}", q);
        }
        config.quantile = q;
    }
    if let Some(ratio) = args.ratio {
        if !(ratio > 0.0 && ratio < 1.0) {
            bail!("--ratio must be within (0, 1), got {}", ratio);
        }
        config.anomaly_ratio = ratio;
    }
    if let Some(scale) = args.scale {
        if !(scale >= 0.0 && scale.is_finite()) {
            bail!("--scale must be a non-negative number, got {}", scale);
        }
        config.anomaly_scale = scale;
    }
    Ok(())
}

/// Load an experiment plan from `path`, or the built-in plan of
/// `sample_size` rows per dataset when no path is given.
///
/// A path that does not exist yet receives the built-in plan, so it can be
/// edited and re-run. Failing to write it is an error.
pub fn load_plan(path: Option<&str>, sample_size: usize) -> Result<ExperimentPlan> {
    let Some(path) = path else {
        return Ok(ExperimentPlan::builtin(sample_size));
    };
    let plan_path = Path::new(path);

    if plan_path.exists() {
        debug!(?plan_path, "Loading experiment plan");
        let content = std::fs::read_to_string(plan_path)
            .with_context(|| format!("failed to read plan: {}", plan_path.display()))?;
        let plan = parse_plan(&content)
            .with_context(|| format!("failed to parse plan: {}", plan_path.display()))?;
        Ok(plan)
    } else {
        warn!(
            "Plan file {} not found, running the built-in plan and saving it there",
            plan_path.display()
        );
        let plan = ExperimentPlan::builtin(sample_size);
        let toml_str = toml::to_string_pretty(&plan).context("failed to serialize built-in plan")?;
        std::fs::write(plan_path, toml_str)
            .with_context(|| format!("failed to write plan: {}", plan_path.display()))?;
        Ok(plan)
    }
}

pub fn parse_plan(content: &str) -> Result<ExperimentPlan> {
    let plan: ExperimentPlan = toml::from_str(content)?;
    if plan.datasets.is_empty() {
        bail!("plan lists no datasets");
    }
    if plan.sample_size == 0 {
        bail!("sample_size must be at least 1");
    }
    Ok(plan)
}

/// Generator for the `--distribution` flag of the workflow command.
pub fn workflow_generator(name: &str) -> Result<GeneratorSpec> {
    match name.to_ascii_lowercase().as_str() {
        "gaussian" | "normal" => Ok(GeneratorSpec::gaussian(2)),
        "exponential" | "exp" => Ok(GeneratorSpec::exponential(vec![1.0, 1.5])),
        "lognormal" => Ok(GeneratorSpec::lognormal(2, 0.0, 0.6)),
        "bimodal" => Ok(GeneratorSpec::bimodal(2, 3.0)),
        other => bail!("unknown distribution '{}'", other),
    }
}
