//! Row-major point clouds and the vectors aligned with them.
//!
//! A [`Dataset`] is created once by a generator and never mutated in place;
//! transformations such as anomaly injection build a new dataset. [`Labels`]
//! and [`Scores`] are aligned with a dataset by row index.

use serde::{Deserialize, Serialize};

use crate::error::{LabError, Result};

/// `n` rows of `dim` real-valued features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    rows: Vec<Vec<f64>>,
    dim: usize,
}

impl Dataset {
    /// Build a dataset, rejecting rows whose length differs from the first row.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let dim = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(LabError::RaggedRows {
                row,
                expected: dim,
                found: r.len(),
            });
        }
        Ok(Self { rows, dim })
    }

    /// Empty dataset with a fixed dimensionality.
    pub fn empty(dim: usize) -> Self {
        Self {
            rows: Vec::new(),
            dim,
        }
    }

    /// Build a dataset from `dim` equally long columns.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let n = columns.first().map(|c| c.len()).unwrap_or(0);
        if let Some(c) = columns.iter().find(|c| c.len() != n) {
            return Err(LabError::DimensionMismatch(format!(
                "column of length {} next to columns of length {}",
                c.len(),
                n
            )));
        }
        let rows = (0..n)
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect();
        Ok(Self {
            rows,
            dim: columns.len(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Copy of feature `j` across all rows.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[j]).collect()
    }

    /// Per-feature arithmetic mean. Empty datasets yield zeros.
    pub fn column_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.dim];
        if self.rows.is_empty() {
            return means;
        }
        for row in &self.rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        let n = self.rows.len() as f64;
        for m in &mut means {
            *m /= n;
        }
        means
    }

    /// Per-feature population standard deviation (divides by `n`).
    pub fn column_stds(&self) -> Vec<f64> {
        let means = self.column_means();
        let mut variance = vec![0.0; self.dim];
        if self.rows.is_empty() {
            return variance;
        }
        for row in &self.rows {
            for ((acc, v), m) in variance.iter_mut().zip(row).zip(&means) {
                let diff = v - m;
                *acc += diff * diff;
            }
        }
        let n = self.rows.len() as f64;
        variance.iter().map(|v| (v / n).sqrt()).collect()
    }

    /// Append the rows of `other` after the rows of `self`.
    pub fn vstack(mut self, other: Dataset) -> Result<Self> {
        if self.rows.is_empty() {
            return Ok(other);
        }
        if !other.rows.is_empty() && other.dim != self.dim {
            return Err(LabError::DimensionMismatch(format!(
                "cannot stack {}-d rows onto a {}-d dataset",
                other.dim, self.dim
            )));
        }
        self.rows.extend(other.rows);
        Ok(self)
    }

    /// Copy of `self` with the given rows swapped for new values.
    pub fn with_rows_replaced<I>(&self, replacements: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, Vec<f64>)>,
    {
        let mut rows = self.rows.clone();
        for (i, row) in replacements {
            if row.len() != self.dim {
                return Err(LabError::RaggedRows {
                    row: i,
                    expected: self.dim,
                    found: row.len(),
                });
            }
            let slot = rows.get_mut(i).ok_or_else(|| {
                LabError::InvalidParameter(format!(
                    "row {} out of range for {} rows",
                    i,
                    self.rows.len()
                ))
            })?;
            *slot = row;
        }
        Ok(Self {
            rows,
            dim: self.dim,
        })
    }
}

/// Binary ground truth: 1 marks an injected anomaly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels(pub Vec<u8>);

impl Labels {
    pub fn zeros(n: usize) -> Self {
        Self(vec![0; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn count_positive(&self) -> usize {
        self.0.iter().filter(|&&y| y == 1).count()
    }

    /// Row indices labelled as anomalies.
    pub fn positive_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, &y)| y == 1)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether both classes occur; ROC-AUC is undefined otherwise.
    pub fn has_both_classes(&self) -> bool {
        let pos = self.count_positive();
        pos > 0 && pos < self.0.len()
    }
}

/// Per-row anomaly scores; higher means more anomalous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores(pub Vec<f64>);

impl Scores {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn all_finite(&self) -> bool {
        self.0.iter().all(|s| s.is_finite())
    }

    /// Row indices sorted from most to least anomalous.
    pub fn ranking(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.0.len()).collect();
        idx.sort_by(|&a, &b| self.0[b].total_cmp(&self.0[a]));
        idx
    }
}
