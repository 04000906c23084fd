//! Quantile thresholding and detection metrics against ground truth.

use std::fmt;

use serde::{Deserialize, Serialize};

use outlier_core::{Labels, Scores};

use crate::algorithms::stats::quantile;

/// Cutoff below which roughly `100·q` percent of the scores fall.
pub fn threshold_by_quantile(scores: &Scores, q: f64) -> f64 {
    quantile(scores.as_slice(), q)
}

/// 1 where `score >= threshold`, else 0.
pub fn predict(scores: &Scores, threshold: f64) -> Vec<u8> {
    scores.0.iter().map(|&s| u8::from(s >= threshold)).collect()
}

/// Confusion counts for the positive (anomaly) class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confusion {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tn: usize,
}

impl Confusion {
    pub fn from_predictions(labels: &Labels, predictions: &[u8]) -> Self {
        let mut c = Confusion::default();
        for (&y, &p) in labels.as_slice().iter().zip(predictions) {
            match (y == 1, p == 1) {
                (true, true) => c.tp += 1,
                (false, true) => c.fp += 1,
                (true, false) => c.fn_ += 1,
                (false, false) => c.tn += 1,
            }
        }
        c
    }

    /// `tp / (tp + fp)`, 0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// `tp / (tp + fn)`, 0 when there are no positives.
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall, 0 when both are 0.
    pub fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Binary precision, recall and F1 with zero division reported as 0.
pub fn precision_recall_f1(labels: &Labels, predictions: &[u8]) -> (f64, f64, f64) {
    let c = Confusion::from_predictions(labels, predictions);
    (c.precision(), c.recall(), c.f1())
}

/// One operating point of a ROC curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    /// From (0, 0) to (1, 1), one point per distinct score.
    pub points: Vec<RocPoint>,
    pub auc: f64,
}

/// ROC curve of `scores` against `labels`; `None` unless both classes occur.
///
/// Rows with equal scores enter the curve together, so ties contribute a
/// diagonal segment (half credit).
pub fn roc_curve(scores: &Scores, labels: &Labels) -> Option<RocCurve> {
    if !labels.has_both_classes() || scores.len() != labels.len() {
        return None;
    }
    let total_pos = labels.count_positive() as f64;
    let total_neg = (labels.len() - labels.count_positive()) as f64;

    let s = scores.as_slice();
    let y = labels.as_slice();
    let mut order: Vec<usize> = (0..s.len()).collect();
    order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));

    let mut points = vec![RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    }];
    let (mut tp, mut fp) = (0usize, 0usize);
    let mut i = 0;
    while i < order.len() {
        let current = s[order[i]];
        while i < order.len() && s[order[i]].total_cmp(&current).is_eq() {
            if y[order[i]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            threshold: current,
            fpr: fp as f64 / total_neg,
            tpr: tp as f64 / total_pos,
        });
    }

    let auc = points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum();

    Some(RocCurve { points, auc })
}

/// Area under the ROC curve, NaN when only one class is present.
pub fn roc_auc(scores: &Scores, labels: &Labels) -> f64 {
    roc_curve(scores, labels).map_or(f64::NAN, |c| c.auc)
}

/// Precision, recall and F1 at the quantile threshold plus threshold-free ROC-AUC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// NaN when the labels contain a single class.
    #[serde(serialize_with = "serialize_nan_as_null", deserialize_with = "deserialize_null_as_nan")]
    pub roc_auc: f64,
    pub threshold: f64,
    pub flagged: usize,
}

fn serialize_nan_as_null<S: serde::Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    if v.is_nan() {
        s.serialize_none()
    } else {
        s.serialize_f64(*v)
    }
}

fn deserialize_null_as_nan<'de, D: serde::Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "precision={:.3}  recall={:.3}  F1={:.3}  ROC-AUC={:.3}",
            self.precision, self.recall, self.f1, self.roc_auc
        )
    }
}

/// Threshold `scores` at quantile `q` and compare against `labels`.
pub fn evaluate(scores: &Scores, labels: &Labels, q: f64) -> EvaluationResult {
    let threshold = threshold_by_quantile(scores, q);
    let predictions = predict(scores, threshold);
    let (precision, recall, f1) = precision_recall_f1(labels, &predictions);
    EvaluationResult {
        precision,
        recall,
        f1,
        roc_auc: roc_auc(scores, labels),
        threshold,
        flagged: predictions.iter().filter(|&&p| p == 1).count(),
    }
}
