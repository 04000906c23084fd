use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

/// Experiment defaults shared by every driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Seed for the shared random stream.
    pub seed: u64,
    /// Rows per generated dataset in the comparison experiments.
    pub sample_size: usize,
    /// Fraction of rows perturbed by the injector.
    pub anomaly_ratio: f64,
    /// Standard deviation of the injected noise.
    pub anomaly_scale: f64,
    /// Quantile used to binarize scores.
    pub quantile: f64,
    pub forest: ForestConfig,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            seed: 42,
            sample_size: 1500,
            anomaly_ratio: 0.05,
            anomaly_scale: 8.0,
            quantile: 0.95,
            forest: ForestConfig::default(),
        }
    }
}

impl LabConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `OUTLIER_PROFILE`. When set (e.g. `SMALL`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("OUTLIER_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let d = Self::default();
        Self {
            profile: p.to_string(),
            seed: profiled_env_parse(p, "SEED", d.seed),
            sample_size: profiled_env_parse(p, "SAMPLE_SIZE", d.sample_size),
            anomaly_ratio: profiled_env_parse(p, "ANOMALY_RATIO", d.anomaly_ratio),
            anomaly_scale: profiled_env_parse(p, "ANOMALY_SCALE", d.anomaly_scale),
            quantile: profiled_env_parse(p, "QUANTILE", d.quantile),
            forest: ForestConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  seed:        {}", self.seed);
        tracing::info!("  samples:     n={}", self.sample_size);
        tracing::info!("  anomalies:   ratio={}, scale={}", self.anomaly_ratio, self.anomaly_scale);
        tracing::info!("  threshold:   q={}", self.quantile);
        tracing::info!(
            "  forest:      trees={}, max_samples={}, seed={}",
            self.forest.n_estimators,
            self.forest.max_samples,
            self.forest.seed
        );
    }

    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "seed": self.seed,
            "sample_size": self.sample_size,
            "anomaly_ratio": self.anomaly_ratio,
            "anomaly_scale": self.anomaly_scale,
            "quantile": self.quantile,
            "forest": {
                "n_estimators": self.forest.n_estimators,
                "max_samples": self.forest.max_samples,
                "seed": self.forest.seed,
            },
        })
    }
}

// ── Isolation forest ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    /// Upper bound on the per-tree subsample; capped at the dataset size.
    pub max_samples: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            seed: 42,
        }
    }
}

impl ForestConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            n_estimators: profiled_env_parse(p, "IFOREST_TREES", d.n_estimators),
            max_samples: profiled_env_parse(p, "IFOREST_MAX_SAMPLES", d.max_samples),
            seed: profiled_env_parse(p, "IFOREST_SEED", d.seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_experiments() {
        let c = LabConfig::default();
        assert_eq!(c.seed, 42);
        assert_eq!(c.sample_size, 1500);
        assert_eq!(c.quantile, 0.95);
        assert_eq!(c.forest.n_estimators, 100);
        assert_eq!(c.profile_label(), "default");
    }

    #[test]
    fn profiled_keys_take_precedence() {
        env::set_var("OUTLIERTEST_SEED", "7");
        let c = LabConfig::for_profile("outliertest");
        assert_eq!(c.profile, "OUTLIERTEST");
        assert_eq!(c.seed, 7);
        env::remove_var("OUTLIERTEST_SEED");
    }

    #[test]
    fn unparseable_values_fall_back() {
        env::set_var("BADPROFILE_QUANTILE", "not-a-number");
        let c = LabConfig::for_profile("badprofile");
        assert_eq!(c.quantile, 0.95);
        env::remove_var("BADPROFILE_QUANTILE");
    }
}
