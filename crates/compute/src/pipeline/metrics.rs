use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stage timings, updated incrementally as experiments run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineMetrics {
    /// Experiments completed since the pipeline was created.
    pub experiments_run: u64,
    /// When the last experiment completed.
    pub last_run: Option<DateTime<Utc>>,
    /// Rows scored across all experiments.
    pub rows_scored: u64,
    /// Duration of the last injection in microseconds.
    pub inject_us: u64,
    /// Average scoring time per method in milliseconds.
    pub scoring_avg_ms: BTreeMap<String, f64>,

    #[serde(skip)]
    scoring_totals: BTreeMap<String, (u64, f64)>,
}

impl PipelineMetrics {
    pub fn record_injection(&mut self, elapsed: Duration) {
        self.inject_us = elapsed.as_micros() as u64;
    }

    /// Record one scoring pass of `method` over `rows` rows.
    pub fn record_scoring(&mut self, method: &str, rows: usize, elapsed: Duration) {
        self.rows_scored += rows as u64;
        let entry = self
            .scoring_totals
            .entry(method.to_owned())
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += elapsed.as_secs_f64() * 1000.0;
        self.scoring_avg_ms
            .insert(method.to_owned(), entry.1 / entry.0 as f64);
    }

    pub fn record_experiment(&mut self) {
        self.experiments_run += 1;
        self.last_run = Some(Utc::now());
    }

    /// Start a timer for one stage.
    pub fn timer(&self) -> StageTimer {
        StageTimer {
            start: Instant::now(),
        }
    }
}

/// A scoped timer for one pipeline stage.
pub struct StageTimer {
    start: Instant,
}

impl StageTimer {
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
