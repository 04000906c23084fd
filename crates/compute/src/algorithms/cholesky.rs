use outlier_core::{LabError, Result};

/// Lower-triangular factor `L` with `L·Lᵀ = cov`.
///
/// Only the lower triangle of `cov` is read. Singular positive
/// semi-definite matrices are accepted: a pivot that is zero within
/// tolerance produces a zero column, so the sampled points lie on the
/// matrix's support. A clearly negative pivot is rejected.
pub fn cholesky_psd(cov: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let d = cov.len();
    if let Some(row) = cov.iter().find(|r| r.len() != d) {
        return Err(LabError::DimensionMismatch(format!(
            "covariance must be square: {} rows but a row of length {}",
            d,
            row.len()
        )));
    }

    let scale = cov
        .iter()
        .enumerate()
        .map(|(i, r)| r[i].abs())
        .fold(1.0_f64, f64::max);
    let tol = 1e-10 * scale;

    let mut l = vec![vec![0.0; d]; d];
    for j in 0..d {
        let pivot = cov[j][j] - (0..j).map(|k| l[j][k] * l[j][k]).sum::<f64>();
        if pivot < -tol {
            return Err(LabError::NotPositiveSemiDefinite { pivot: j, value: pivot });
        }
        if pivot <= tol {
            // Degenerate direction: the column stays zero.
            continue;
        }
        let diag = pivot.sqrt();
        l[j][j] = diag;
        for i in (j + 1)..d {
            let s = cov[i][j] - (0..j).map(|k| l[i][k] * l[j][k]).sum::<f64>();
            l[i][j] = s / diag;
        }
    }
    Ok(l)
}

/// `L · z` for a lower-triangular `L`.
pub fn lower_mul(l: &[Vec<f64>], z: &[f64]) -> Vec<f64> {
    l.iter()
        .enumerate()
        .map(|(i, row)| row[..=i].iter().zip(z).map(|(a, b)| a * b).sum())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(l: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let d = l.len();
        let mut out = vec![vec![0.0; d]; d];
        for i in 0..d {
            for j in 0..d {
                out[i][j] = (0..d).map(|k| l[i][k] * l[j][k]).sum();
            }
        }
        out
    }

    #[test]
    fn factorizes_positive_definite() {
        let cov = vec![vec![1.0, 0.8], vec![0.8, 1.2]];
        let l = cholesky_psd(&cov).unwrap();
        let back = reconstruct(&l);
        for i in 0..2 {
            for j in 0..2 {
                assert!((back[i][j] - cov[i][j]).abs() < 1e-12);
            }
        }
        assert_eq!(l[0][1], 0.0);
    }

    #[test]
    fn accepts_singular_psd() {
        // Perfectly correlated features: rank one.
        let cov = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let l = cholesky_psd(&cov).unwrap();
        assert_eq!(l[1][1], 0.0);
        let back = reconstruct(&l);
        assert!((back[1][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_indefinite() {
        let cov = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        assert!(matches!(
            cholesky_psd(&cov),
            Err(LabError::NotPositiveSemiDefinite { pivot: 1, .. })
        ));
    }

    #[test]
    fn rejects_non_square() {
        let cov = vec![vec![1.0, 0.0], vec![0.0]];
        assert!(cholesky_psd(&cov).is_err());
    }

    #[test]
    fn lower_mul_ignores_upper_triangle() {
        let l = vec![vec![2.0, 99.0], vec![1.0, 3.0]];
        assert_eq!(lower_mul(&l, &[1.0, 1.0]), vec![2.0, 4.0]);
    }
}
