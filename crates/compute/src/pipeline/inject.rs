//! Point-anomaly injection.
//!
//! A random subset of rows receives large zero-mean Gaussian noise on every
//! feature; the returned labels mark exactly those rows.

use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use outlier_core::{Dataset, LabError, Labels, Result};

/// Number of rows the injector perturbs: `max(1, round(n·ratio))`, capped at `n`.
pub fn anomaly_count(n: usize, ratio: f64) -> usize {
    let k = (n as f64 * ratio).round();
    let k = if k.is_finite() && k > 0.0 { k as usize } else { 0 };
    k.max(1).min(n)
}

/// Perturb `anomaly_count(n, ratio)` distinct rows of `x` with `N(0, scale²)`
/// noise per feature.
///
/// The returned dataset equals `x` everywhere except at the labelled rows.
pub fn inject_point_anomalies<R: Rng + ?Sized>(
    x: &Dataset,
    ratio: f64,
    scale: f64,
    rng: &mut R,
) -> Result<(Dataset, Labels)> {
    let n = x.n_rows();
    if n == 0 {
        return Err(LabError::InvalidParameter(
            "cannot inject anomalies into an empty dataset".into(),
        ));
    }
    let noise = Normal::new(0.0, scale).map_err(|e| LabError::InvalidParameter(e.to_string()))?;

    let k = anomaly_count(n, ratio);
    let chosen = index::sample(rng, n, k).into_vec();

    let mut labels = Labels::zeros(n);
    let mut replacements = Vec::with_capacity(k);
    for &i in &chosen {
        let row: Vec<f64> = x.row(i).iter().map(|v| v + noise.sample(rng)).collect();
        replacements.push((i, row));
        labels.0[i] = 1;
    }

    debug!(n, k, ratio, scale, "injected point anomalies");
    Ok((x.with_rows_replaced(replacements)?, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid(n: usize) -> Dataset {
        Dataset::from_rows((0..n).map(|i| vec![i as f64, -(i as f64)]).collect()).unwrap()
    }

    #[test]
    fn count_rounds_and_floors_at_one() {
        assert_eq!(anomaly_count(1500, 0.05), 75);
        assert_eq!(anomaly_count(10, 0.01), 1);
        assert_eq!(anomaly_count(30, 0.05), 2); // 1.5 rounds up
        assert_eq!(anomaly_count(1, 0.9), 1);
        assert_eq!(anomaly_count(3, 2.0), 3);
    }

    #[test]
    fn label_sum_matches_count() {
        let mut rng = StdRng::seed_from_u64(42);
        for &(n, r) in &[(1usize, 0.5), (7, 0.3), (100, 0.05), (999, 0.123), (1500, 0.05)] {
            let (_, y) = inject_point_anomalies(&grid(n), r, 8.0, &mut rng).unwrap();
            assert_eq!(y.count_positive(), anomaly_count(n, r), "n={} r={}", n, r);
            assert_eq!(y.len(), n);
        }
    }

    #[test]
    fn only_labelled_rows_change() {
        let mut rng = StdRng::seed_from_u64(1);
        let x = grid(200);
        let (x2, y) = inject_point_anomalies(&x, 0.1, 8.0, &mut rng).unwrap();
        for i in 0..x.n_rows() {
            if y.0[i] == 1 {
                assert_ne!(x.row(i), x2.row(i));
            } else {
                assert_eq!(x.row(i), x2.row(i));
            }
        }
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(inject_point_anomalies(&Dataset::empty(2), 0.05, 8.0, &mut rng).is_err());
    }

    #[test]
    fn negative_scale_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(inject_point_anomalies(&grid(10), 0.05, -1.0, &mut rng).is_err());
    }
}
