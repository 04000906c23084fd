mod cli;
mod config;
mod report;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use outlier_compute::density::{summarize_boundaries, summarize_joint, DensityParams};
use outlier_compute::experiments::workflow::WORKFLOW_SAMPLE_SIZE;
use outlier_compute::experiments::{
    assumption_mismatch, compare_methods, generate_plan, roc_demo, run_workflow, Detector,
};
use outlier_compute::{GeneratorSpec, Pipeline};
use outlier_core::config::load_dotenv;
use outlier_core::{Dataset, LabConfig};

use crate::cli::{CliArgs, Command};
use crate::config::{apply_overrides, load_plan, workflow_generator};
use crate::report::Console;

/// Grid size and sweep length of the boundary experiment.
const BOUNDARY_GRID: usize = 1000;
const BOUNDARY_FINAL_VARIANCE: u32 = 40;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let mut config = LabConfig::from_env();
    apply_overrides(&mut config, &args.global).context("invalid command-line override")?;
    config.log_summary();

    let console = Console::new(args.global.json);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pipeline = Pipeline::new(&config);

    match args.command {
        Command::Assumption => {
            let report = assumption_mismatch(config.quantile, &mut rng)
                .context("assumption experiment failed")?;
            console.assumption(&report)?;
        }
        Command::Compare { plan } => {
            let plan = load_plan(plan.as_deref(), config.sample_size)?;
            let datasets = generate_plan(&plan, &mut rng).context("failed to generate datasets")?;
            let report = compare_methods(&datasets, &mut pipeline, &mut rng)
                .context("comparison failed")?;
            console.comparison(&report)?;
        }
        Command::Roc { dataset, plan } => {
            let plan = load_plan(plan.as_deref(), config.sample_size)?;
            let datasets = generate_plan(&plan, &mut rng).context("failed to generate datasets")?;
            let (name, x) = find_dataset(&datasets, &dataset)?;
            let report = roc_demo(x, name, &mut pipeline, &mut rng).context("ROC demo failed")?;
            console.roc(&report)?;
        }
        Command::Workflow {
            distribution,
            detector,
            n,
        } => {
            let spec = workflow_generator(&distribution)?;
            let label = spec.family();
            let report = run_workflow(&spec, label, detector, n, &mut pipeline, &mut rng)
                .with_context(|| format!("workflow on {} failed", label))?;
            console.workflow(&report)?;
        }
        Command::Boundaries { mean, std, k } => {
            let report = summarize_boundaries(
                mean,
                std,
                k,
                BOUNDARY_GRID,
                BOUNDARY_FINAL_VARIANCE,
                &mut rng,
            )
            .context("boundary experiment failed")?;
            console.boundaries(&report)?;
        }
        Command::Density {
            x_mean,
            x_std,
            y_mean,
            y_std,
        } => {
            if !(x_std > 0.0 && y_std > 0.0) {
                bail!("standard deviations must be positive");
            }
            let params = DensityParams {
                x_mean,
                x_std,
                y_mean,
                y_std,
                ..DensityParams::default()
            };
            let summary = summarize_joint(params).context("density grid is empty")?;
            console.density(&summary)?;
        }
        Command::All { plan } => {
            run_all(&config, plan.as_deref(), &mut pipeline, &mut rng, &console)?;
        }
    }

    info!(
        experiments = pipeline.metrics.experiments_run,
        rows = pipeline.metrics.rows_scored,
        "done"
    );
    console.metrics(&pipeline.metrics)?;
    Ok(())
}

/// Assumption mismatch, method comparison, ROC on the exponential set and
/// both reference workflows, all from one random stream.
fn run_all(
    config: &LabConfig,
    plan: Option<&str>,
    pipeline: &mut Pipeline,
    rng: &mut StdRng,
    console: &Console,
) -> Result<()> {
    let assumption =
        assumption_mismatch(config.quantile, rng).context("assumption experiment failed")?;

    let plan = load_plan(plan, config.sample_size)?;
    let datasets = generate_plan(&plan, rng).context("failed to generate datasets")?;
    let comparison = compare_methods(&datasets, pipeline, rng).context("comparison failed")?;

    let roc = match find_dataset(&datasets, "Exponential") {
        Ok((name, x)) => Some(roc_demo(x, name, pipeline, rng).context("ROC demo failed")?),
        Err(_) => None,
    };

    let gaussian = run_workflow(
        &GeneratorSpec::gaussian(2),
        "Gaussian",
        Detector::Z,
        WORKFLOW_SAMPLE_SIZE,
        pipeline,
        rng,
    )
    .context("Gaussian workflow failed")?;
    let exponential = run_workflow(
        &GeneratorSpec::exponential(vec![1.0, 1.5]),
        "Exponential",
        Detector::Auto,
        WORKFLOW_SAMPLE_SIZE,
        pipeline,
        rng,
    )
    .context("Exponential workflow failed")?;

    if console.is_json() {
        return console.print_json(&serde_json::json!({
            "config": config.summary(),
            "assumption": assumption,
            "comparison": comparison,
            "roc": roc,
            "workflows": [gaussian, exponential],
            "metrics": pipeline.metrics,
        }));
    }

    console.assumption(&assumption)?;
    console.comparison(&comparison)?;
    if let Some(roc) = &roc {
        console.roc(roc)?;
    }
    console.workflow(&gaussian)?;
    console.workflow(&exponential)
}

fn find_dataset<'a>(
    datasets: &'a [(String, Dataset)],
    name: &str,
) -> Result<(&'a str, &'a Dataset)> {
    match datasets.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        Some((n, x)) => Ok((n.as_str(), x)),
        None => {
            let names: Vec<&str> = datasets.iter().map(|(n, _)| n.as_str()).collect();
            bail!("no dataset named '{}' (available: {})", name, names.join(", "))
        }
    }
}
