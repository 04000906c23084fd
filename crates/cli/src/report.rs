use anyhow::{Context, Result};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use serde::Serialize;
use std::io::{self, Write};

use outlier_compute::density::{BoundaryReport, DensitySummary};
use outlier_compute::experiments::{AssumptionReport, ComparisonReport, RocReport, WorkflowReport};
use outlier_compute::pipeline::metrics::PipelineMetrics;
use outlier_compute::EvaluationResult;

/// Color scheme for console reports.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const DATASET: Color = Color::Cyan;
    const GOOD: Color = Color::Green;
    const WARN: Color = Color::Yellow;
    const DIM: Color = Color::DarkGrey;
}

/// `[name]  q=0.95  precision=...  recall=...  F1=...  ROC-AUC=...`
pub fn result_line(name: &str, q: f64, result: &EvaluationResult) -> String {
    format!("[{}]  q={:.2}  {}", name, q, result)
}

/// Writes reports to stdout, as text or as pretty JSON.
pub struct Console {
    json: bool,
}

impl Console {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string_pretty(value).context("failed to serialize report")?;
        println!("{}", text);
        Ok(())
    }

    fn colored(&self, color: Color, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, SetForegroundColor(color), Print(text), ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_header(&self, title: &str) -> Result<()> {
        self.colored(Colors::HEADER, &format!("\n=== {} ===\n", title))
    }

    fn print_dataset(&self, name: &str) -> Result<()> {
        self.colored(Colors::DATASET, &format!("\n--- Dataset: {} ---\n", name))
    }

    fn print_dim(&self, text: &str) -> Result<()> {
        self.colored(Colors::DIM, &format!("{}\n", text))
    }

    pub fn assumption(&self, report: &AssumptionReport) -> Result<()> {
        if self.json {
            return self.print_json(report);
        }
        self.print_header("Wrong assumptions vs estimated parameters")?;
        for (label, summary) in [("wrong", &report.wrong), ("estimated", &report.estimated)] {
            println!(
                "{:<10} mean=[{}]  std=[{}]  threshold={:.3}  flagged={}",
                label,
                join(&summary.assume_mean),
                join(&summary.assume_std),
                summary.threshold,
                summary.count()
            );
        }
        let shared = report
            .wrong
            .flagged
            .iter()
            .filter(|i| report.estimated.flagged.contains(i))
            .count();
        self.print_dim(&format!(
            "rows flagged by both: {} of {}",
            shared,
            report.wrong.count()
        ))
    }

    pub fn comparison(&self, report: &ComparisonReport) -> Result<()> {
        if self.json {
            return self.print_json(report);
        }
        self.print_header("Controlled experiments")?;
        for dataset in &report.datasets {
            self.print_dataset(&dataset.name)?;
            for (method, result) in &dataset.results {
                let name = format!("{} | {}", dataset.name, method);
                println!("{}", result_line(&name, report.quantile, result));
            }
        }

        self.print_header("F1 by method")?;
        let names: Vec<&str> = report.datasets.iter().map(|d| d.name.as_str()).collect();
        println!("{:<16} {}", "", names.iter().map(|n| format!("{:>12}", n)).collect::<String>());
        for (method, f1s) in report.f1_summary() {
            let cells: String = f1s.iter().map(|f| format!("{:>12.3}", f)).collect();
            println!("{:<16} {}", method.label(), cells);
        }
        for (dataset, method) in report.best_by_f1() {
            self.colored(Colors::GOOD, &format!("best on {}: {}\n", dataset, method))?;
        }
        Ok(())
    }

    pub fn roc(&self, report: &RocReport) -> Result<()> {
        if self.json {
            return self.print_json(report);
        }
        self.print_header(&format!("ROC on {}", report.name))?;
        for (method, curve) in &report.curves {
            println!(
                "{:<16} AUC={:.2}  points={}",
                method.label(),
                curve.auc,
                curve.points.len()
            );
        }
        Ok(())
    }

    pub fn workflow(&self, report: &WorkflowReport) -> Result<()> {
        if self.json {
            return self.print_json(report);
        }
        self.print_header(&format!("Workflow: {}", report.label))?;
        let name = format!("{} | {}", report.label, report.detector);
        println!("{}", result_line(&name, report.quantile, &report.result));
        println!(
            "{} | feature skewness (mean over dims): {:.2}",
            report.label,
            report.diagnostics.mean_abs_skew()
        );
        println!(
            "{} | feature excess kurtosis (mean over dims): {:.2}",
            report.label,
            report.diagnostics.mean_abs_kurtosis()
        );
        let color = if report.diagnostics.looks_gaussian() {
            Colors::GOOD
        } else {
            Colors::WARN
        };
        self.colored(
            color,
            &format!(
                "detector: {} (requested {}), flagged {} rows\n",
                report.detector,
                report.requested,
                report.flagged.len()
            ),
        )
    }

    pub fn boundaries(&self, report: &BoundaryReport) -> Result<()> {
        if self.json {
            return self.print_json(report);
        }
        self.print_header(&format!(
            "Outlier boundaries for N({}, {}²), k={}",
            report.mean, report.std, report.k
        ))?;
        println!(
            "mean ± k·std:      [{:.2}, {:.2}]",
            report.grid.bounds.lower, report.grid.bounds.upper
        );
        println!("grid outliers:     {:.2}%", report.grid.percentage);
        println!(
            "sample (std rule): {:.2}%  ({} rows)",
            report.sample_std.percentage, report.sample_std.count
        );
        println!(
            "sample (IQR rule): {:.2}%  ({} rows, fences [{:.2}, {:.2}])",
            report.sample_iqr.percentage,
            report.sample_iqr.count,
            report.sample_iqr.bounds.lower,
            report.sample_iqr.bounds.upper
        );

        self.print_header("Percentage of outliers as the spread grows")?;
        for point in &report.sweep {
            println!("std={:>4.0}  outliers={:>6.2}%", point.std, point.percentage);
        }
        Ok(())
    }

    pub fn density(&self, summary: &DensitySummary) -> Result<()> {
        if self.json {
            return self.print_json(summary);
        }
        let p = &summary.params;
        self.print_header("Joint density of independent normals")?;
        println!(
            "X ~ N({}, {}²), Y ~ N({}, {}²) on [0, {}]², {} points per axis",
            p.x_mean, p.x_std, p.y_mean, p.y_std, p.boundary, p.size
        );
        println!(
            "peak at x={:.2}, y={:.2}: {:.5}",
            summary.peak_at.0, summary.peak_at.1, summary.peak_density
        );
        println!("mass on grid: {:.4}", summary.mass);
        Ok(())
    }

    pub fn metrics(&self, metrics: &PipelineMetrics) -> Result<()> {
        if self.json {
            return Ok(());
        }
        self.print_dim(&format!(
            "\n{} experiments, {} rows scored",
            metrics.experiments_run, metrics.rows_scored
        ))?;
        for (method, ms) in &metrics.scoring_avg_ms {
            self.print_dim(&format!("  {:<16} {:.2} ms avg", method, ms))?;
        }
        Ok(())
    }
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:.2}", v))
        .collect::<Vec<_>>()
        .join(", ")
}
