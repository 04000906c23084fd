//! Synthetic point clouds from known probability families.
//!
//! Every generator draws from the caller's random stream, so a fixed seed
//! and a fixed call order reproduce the same datasets.

use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use outlier_core::{Dataset, LabError, Result};

use crate::algorithms::cholesky::{cholesky_psd, lower_mul};

/// Variance of each bimodal cluster along every axis.
const BIMODAL_CLUSTER_VARIANCE: f64 = 0.5;

fn default_dim() -> usize {
    2
}

fn default_lognormal_sigma() -> f64 {
    0.5
}

fn default_separation() -> f64 {
    3.0
}

/// A distribution family together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorSpec {
    /// Multivariate normal; mean defaults to zero, covariance to identity.
    Gaussian {
        #[serde(default = "default_dim")]
        d: usize,
        #[serde(default)]
        mean: Option<Vec<f64>>,
        #[serde(default)]
        cov: Option<Vec<Vec<f64>>>,
    },
    /// Independent exponential features with per-dimension rates (default 1).
    Exponential {
        #[serde(default = "default_dim")]
        d: usize,
        #[serde(default)]
        rates: Option<Vec<f64>>,
    },
    /// Log-normal with the same underlying mean and sigma on every feature.
    #[serde(rename = "lognormal")]
    LogNormal {
        #[serde(default = "default_dim")]
        d: usize,
        #[serde(default)]
        mean: f64,
        #[serde(default = "default_lognormal_sigma")]
        sigma: f64,
    },
    /// Two isotropic Gaussian clusters, the second shifted by `separation`
    /// along every axis.
    Bimodal {
        #[serde(default = "default_dim")]
        d: usize,
        #[serde(default = "default_separation")]
        separation: f64,
    },
}

impl GeneratorSpec {
    pub fn gaussian(d: usize) -> Self {
        GeneratorSpec::Gaussian {
            d,
            mean: None,
            cov: None,
        }
    }

    pub fn exponential(rates: Vec<f64>) -> Self {
        GeneratorSpec::Exponential {
            d: rates.len(),
            rates: Some(rates),
        }
    }

    pub fn lognormal(d: usize, mean: f64, sigma: f64) -> Self {
        GeneratorSpec::LogNormal { d, mean, sigma }
    }

    pub fn bimodal(d: usize, separation: f64) -> Self {
        GeneratorSpec::Bimodal { d, separation }
    }

    /// Family name, used as the default dataset label.
    pub fn family(&self) -> &'static str {
        match self {
            GeneratorSpec::Gaussian { .. } => "Gaussian",
            GeneratorSpec::Exponential { .. } => "Exponential",
            GeneratorSpec::LogNormal { .. } => "LogNormal",
            GeneratorSpec::Bimodal { .. } => "Bimodal",
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            GeneratorSpec::Gaussian { d, .. }
            | GeneratorSpec::Exponential { d, .. }
            | GeneratorSpec::LogNormal { d, .. }
            | GeneratorSpec::Bimodal { d, .. } => *d,
        }
    }
}

/// Draw `n` rows from the distribution described by `spec`.
pub fn generate<R: Rng + ?Sized>(spec: &GeneratorSpec, n: usize, rng: &mut R) -> Result<Dataset> {
    debug!(family = spec.family(), n, d = spec.dim(), "generating dataset");
    match spec {
        GeneratorSpec::Gaussian { d, mean, cov } => {
            gaussian(n, *d, mean.as_deref(), cov.as_deref(), rng)
        }
        GeneratorSpec::Exponential { d, rates } => {
            let rates = rates.clone().unwrap_or_else(|| vec![1.0; *d]);
            if rates.len() != *d {
                return Err(LabError::DimensionMismatch(format!(
                    "{} exponential rates for d = {}",
                    rates.len(),
                    d
                )));
            }
            exponential(n, &rates, rng)
        }
        GeneratorSpec::LogNormal { d, mean, sigma } => lognormal(n, *d, *mean, *sigma, rng),
        GeneratorSpec::Bimodal { d, separation } => bimodal(n, *d, *separation, rng),
    }
}

/// Multivariate normal samples `mean + L·z` where `L·Lᵀ = cov`.
pub fn gaussian<R: Rng + ?Sized>(
    n: usize,
    d: usize,
    mean: Option<&[f64]>,
    cov: Option<&[Vec<f64>]>,
    rng: &mut R,
) -> Result<Dataset> {
    let mean = mean.map(<[f64]>::to_vec).unwrap_or_else(|| vec![0.0; d]);
    if mean.len() != d {
        return Err(LabError::DimensionMismatch(format!(
            "mean has {} entries for d = {}",
            mean.len(),
            d
        )));
    }

    let factor = match cov {
        Some(cov) => {
            if cov.len() != d {
                return Err(LabError::DimensionMismatch(format!(
                    "covariance has {} rows for d = {}",
                    cov.len(),
                    d
                )));
            }
            cholesky_psd(cov)?
        }
        None => identity(d),
    };

    let rows: Vec<Vec<f64>> = (0..n)
        .map(|_| {
            let z: Vec<f64> = (0..d).map(|_| rng.sample(StandardNormal)).collect();
            lower_mul(&factor, &z)
                .into_iter()
                .zip(&mean)
                .map(|(v, m)| v + m)
                .collect()
        })
        .collect();

    into_dataset(rows, d)
}

/// One exponential column per rate; columns are drawn one after another.
pub fn exponential<R: Rng + ?Sized>(n: usize, rates: &[f64], rng: &mut R) -> Result<Dataset> {
    let columns = rates
        .iter()
        .map(|&rate| {
            if !(rate > 0.0 && rate.is_finite()) {
                return Err(LabError::InvalidParameter(format!(
                    "exponential rate must be positive, got {}",
                    rate
                )));
            }
            let dist = Exp::new(rate).map_err(|e| LabError::InvalidParameter(e.to_string()))?;
            Ok(dist.sample_iter(&mut *rng).take(n).collect::<Vec<f64>>())
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    if n == 0 {
        return Ok(Dataset::empty(rates.len()));
    }
    Dataset::from_columns(&columns)
}

/// `n × d` log-normal draws sharing `mean` and `sigma` of the underlying normal.
pub fn lognormal<R: Rng + ?Sized>(
    n: usize,
    d: usize,
    mean: f64,
    sigma: f64,
    rng: &mut R,
) -> Result<Dataset> {
    let dist = LogNormal::new(mean, sigma).map_err(|e| LabError::InvalidParameter(e.to_string()))?;
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|_| (0..d).map(|_| dist.sample(rng)).collect())
        .collect();
    into_dataset(rows, d)
}

/// Two clusters with covariance `0.5·I`: `n - n/2` rows around the origin
/// followed by `n/2` rows around `separation·1`.
pub fn bimodal<R: Rng + ?Sized>(n: usize, d: usize, separation: f64, rng: &mut R) -> Result<Dataset> {
    let n2 = n / 2;
    let n1 = n - n2;
    let cov: Vec<Vec<f64>> = identity(d)
        .into_iter()
        .map(|row| row.into_iter().map(|v| v * BIMODAL_CLUSTER_VARIANCE).collect())
        .collect();

    let shifted = vec![separation; d];
    let first = gaussian(n1, d, None, Some(cov.as_slice()), rng)?;
    let second = gaussian(n2, d, Some(shifted.as_slice()), Some(cov.as_slice()), rng)?;
    first.vstack(second)
}

/// Keeps the requested dimensionality when no rows were drawn.
fn into_dataset(rows: Vec<Vec<f64>>, d: usize) -> Result<Dataset> {
    if rows.is_empty() {
        return Ok(Dataset::empty(d));
    }
    Dataset::from_rows(rows)
}

fn identity(d: usize) -> Vec<Vec<f64>> {
    (0..d)
        .map(|i| (0..d).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}
