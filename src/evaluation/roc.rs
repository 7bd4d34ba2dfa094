//! ROC curve and area under it

use crate::error::{CreditError, Result};
use super::metrics::check_lengths;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One operating point of the ROC curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    /// Scores `>= threshold` are predicted positive; the first point uses +inf
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

/// ROC curve ordered by descending threshold, from (0, 0) to (1, 1)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
}

impl RocCurve {
    /// Trapezoidal area under the curve
    pub fn auc(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(fpr, tpr)` pairs, ready for plotting
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.fpr, p.tpr)).collect()
    }
}

/// One point per distinct score, so tied scores move the curve diagonally.
///
/// Fails unless both classes are present.
pub fn roc_curve(y_true: &Array1<f64>, scores: &Array1<f64>) -> Result<RocCurve> {
    check_lengths(y_true, scores)?;

    let n_pos = y_true.iter().filter(|&&t| t == 1.0).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(CreditError::ComputationError(
            "ROC curve needs both classes in the scored set".to_string(),
        ));
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(CreditError::ComputationError(
            "ROC curve received NaN scores".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut points = vec![RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    }];
    let (mut tp, mut fp) = (0usize, 0usize);

    for (rank, &idx) in order.iter().enumerate() {
        if y_true[idx] == 1.0 {
            tp += 1;
        } else {
            fp += 1;
        }

        let is_last_of_tie = order
            .get(rank + 1)
            .map_or(true, |&next| scores[next] != scores[idx]);
        if is_last_of_tie {
            points.push(RocPoint {
                threshold: scores[idx],
                fpr: fp as f64 / n_neg as f64,
                tpr: tp as f64 / n_pos as f64,
            });
        }
    }

    Ok(RocCurve { points })
}
