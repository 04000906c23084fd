//! Normal densities on a grid and their joint surface under independence.

pub mod boundaries;

use std::f64::consts::PI;

use serde::Serialize;

pub use boundaries::{
    count_outliers, iqr_bounds, outlier_percentage, outliers_as_function_of_variance, std_bounds,
    summarize_boundaries, BoundaryReport, Bounds, VariancePoint,
};

/// `n` evenly spaced points from `start` to `end`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Density of `N(mean, std²)` at `x`.
pub fn normal_pdf(x: f64, mean: f64, std: f64) -> f64 {
    let coeff = 1.0 / (std * (2.0 * PI).sqrt());
    let z = (x - mean) / std;
    coeff * (-0.5 * z * z).exp()
}

pub fn normal_pdf_curve(xs: &[f64], mean: f64, std: f64) -> Vec<f64> {
    xs.iter().map(|&x| normal_pdf(x, mean, std)).collect()
}

/// Product surface of two 1-D densities.
///
/// `z[i][j] = y[i] · x[j]`: rows follow the y axis, columns the x axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointGrid {
    pub z: Vec<Vec<f64>>,
}

impl JointGrid {
    pub fn rows(&self) -> usize {
        self.z.len()
    }

    pub fn cols(&self) -> usize {
        self.z.first().map_or(0, Vec::len)
    }

    /// Largest cell as `(row, col, value)`, `None` for an empty grid.
    pub fn peak(&self) -> Option<(usize, usize, f64)> {
        self.z
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, &v)| (i, j, v)))
            .fold(None, |best: Option<(usize, usize, f64)>, cell| match best {
                Some(b) if b.2 >= cell.2 => Some(b),
                _ => Some(cell),
            })
    }

    /// Sum of all cells times the cell area, a Riemann estimate of the mass.
    pub fn mass(&self, dx: f64, dy: f64) -> f64 {
        self.z.iter().flatten().sum::<f64>() * dx * dy
    }
}

/// Grid and parameters of the two 1-D normals multiplied together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityParams {
    pub x_mean: f64,
    pub x_std: f64,
    pub y_mean: f64,
    pub y_std: f64,
    /// Both axes run from 0 to `boundary`.
    pub boundary: f64,
    pub size: usize,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            x_mean: 10.0,
            x_std: 2.0,
            y_mean: 10.0,
            y_std: 2.0,
            boundary: 20.0,
            size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensitySummary {
    pub params: DensityParams,
    /// Axis position of the joint maximum as `(x, y)`.
    pub peak_at: (f64, f64),
    pub peak_density: f64,
    /// Riemann estimate of the probability mass on the grid.
    pub mass: f64,
}

/// Multiply the two normals on a square grid and locate the joint peak.
pub fn summarize_joint(params: DensityParams) -> Option<DensitySummary> {
    let axis = linspace(0.0, params.boundary, params.size);
    let x = normal_pdf_curve(&axis, params.x_mean, params.x_std);
    let y = normal_pdf_curve(&axis, params.y_mean, params.y_std);
    let grid = joint_distribution(&x, &y);
    let (i, j, peak) = grid.peak()?;
    let step = if axis.len() > 1 { axis[1] - axis[0] } else { 0.0 };
    Some(DensitySummary {
        params,
        peak_at: (axis[j], axis[i]),
        peak_density: peak,
        mass: grid.mass(step, step),
    })
}

pub fn joint_distribution(x_dist: &[f64], y_dist: &[f64]) -> JointGrid {
    let z = y_dist
        .iter()
        .map(|&y| x_dist.iter().map(|&x| y * x).collect())
        .collect();
    JointGrid { z }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_endpoints() {
        let xs = linspace(0.0, 20.0, 100);
        assert_eq!(xs.len(), 100);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[99], 20.0);
        assert!((xs[1] - 20.0 / 99.0).abs() < 1e-12);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn pdf_peak_and_symmetry() {
        let peak = normal_pdf(10.0, 10.0, 2.0);
        assert!((peak - 1.0 / (2.0 * (2.0 * PI).sqrt())).abs() < 1e-12);
        assert!((normal_pdf(8.0, 10.0, 2.0) - normal_pdf(12.0, 10.0, 2.0)).abs() < 1e-15);
        assert!(normal_pdf(20.0, 10.0, 2.0) < peak);
    }

    #[test]
    fn joint_grid_is_outer_product() {
        let grid = joint_distribution(&[1.0, 2.0, 3.0], &[10.0, 20.0]);
        assert_eq!((grid.rows(), grid.cols()), (2, 3));
        assert_eq!(grid.z[1][2], 60.0);
        assert_eq!(grid.peak(), Some((1, 2, 60.0)));
    }

    #[test]
    fn joint_peak_sits_at_both_means() {
        let axis = linspace(0.0, 20.0, 101);
        let x = normal_pdf_curve(&axis, 6.0, 1.5);
        let y = normal_pdf_curve(&axis, 14.0, 1.5);
        let grid = joint_distribution(&x, &y);
        let (i, j, _) = grid.peak().unwrap();
        assert_eq!((i, j), (70, 30));

        let step = axis[1] - axis[0];
        assert!((grid.mass(step, step) - 1.0).abs() < 0.01);
    }

    #[test]
    fn default_summary_peaks_near_the_means() {
        let summary = summarize_joint(DensityParams::default()).unwrap();
        assert!((summary.peak_at.0 - 10.0).abs() < 0.2);
        assert!((summary.peak_at.1 - 10.0).abs() < 0.2);
        assert!((summary.mass - 1.0).abs() < 0.02);
        assert!(summarize_joint(DensityParams { size: 0, ..DensityParams::default() }).is_none());
    }

    #[test]
    fn empty_grid_has_no_peak() {
        assert!(joint_distribution(&[], &[]).peak().is_none());
    }
}
