use clap::{Args, Parser, Subcommand};

use outlier_compute::Detector;

/// Outlier-detection experiments on synthetic data.
///
/// Generates point clouds from known distributions, injects labelled
/// anomalies and measures how well z-score, IQR and isolation-forest
/// scoring recover them.
#[derive(Parser, Debug)]
#[command(name = "outlier-lab", about = "Outlier-detection experiments on synthetic data")]
pub struct CliArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for values otherwise read from the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Seed for the shared random stream
    #[arg(long, global = true, env = "OUTLIER_SEED")]
    pub seed: Option<u64>,

    /// Quantile used to turn scores into predictions
    #[arg(long, global = true)]
    pub quantile: Option<f64>,

    /// Fraction of rows perturbed by the injector
    #[arg(long, global = true)]
    pub ratio: Option<f64>,

    /// Standard deviation of the injected noise
    #[arg(long, global = true)]
    pub scale: Option<f64>,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Z-score a correlated Gaussian with wrong versus estimated parameters
    Assumption,

    /// Every scorer against every dataset of a plan
    Compare {
        /// TOML experiment plan (built-in four-shape plan when omitted)
        #[arg(long, env = "OUTLIER_PLAN")]
        plan: Option<String>,
    },

    /// ROC curves of every scorer on one dataset
    Roc {
        /// Dataset name from the plan
        #[arg(long, default_value = "Exponential")]
        dataset: String,

        #[arg(long, env = "OUTLIER_PLAN")]
        plan: Option<String>,
    },

    /// Generate, diagnose, inject, detect and evaluate
    Workflow {
        /// Source distribution: gaussian or exponential
        #[arg(long, default_value = "gaussian")]
        distribution: String,

        /// z, iqr, iforest, auto (isolation forest) or shape
        #[arg(long, default_value = "auto")]
        detector: Detector,

        /// Rows to generate
        #[arg(long, default_value = "1200")]
        n: usize,
    },

    /// Outlier boundaries of a 1-D normal and how they move with the spread
    Boundaries {
        #[arg(long, default_value = "50")]
        mean: f64,

        #[arg(long, default_value = "10")]
        std: f64,

        /// Boundary width in standard deviations
        #[arg(long, default_value = "2")]
        k: f64,
    },

    /// Joint density of two independent normals
    Density {
        #[arg(long, default_value = "10")]
        x_mean: f64,

        #[arg(long, default_value = "2")]
        x_std: f64,

        #[arg(long, default_value = "10")]
        y_mean: f64,

        #[arg(long, default_value = "2")]
        y_std: f64,
    },

    /// Run assumption, compare, roc and both workflows in sequence
    All {
        #[arg(long, env = "OUTLIER_PLAN")]
        plan: Option<String>,
    },
}
