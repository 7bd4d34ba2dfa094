//! Point metrics and the confusion matrix

use crate::error::{CreditError, Result};
use super::roc::roc_curve;
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// 2x2 counts of actual x predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    /// Count outcomes with `proba >= threshold` as the positive prediction
    pub fn at_threshold(y_true: &Array1<f64>, proba: &Array1<f64>, threshold: f64) -> Result<Self> {
        check_lengths(y_true, proba)?;

        let mut cm = Self::default();
        for (&t, &p) in y_true.iter().zip(proba.iter()) {
            match (t == 1.0, p >= threshold) {
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (true, true) => cm.tp += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    pub fn predicted_positives(&self) -> usize {
        self.tp + self.fp
    }

    pub fn actual_positives(&self) -> usize {
        self.tp + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        (self.tp + self.tn) as f64 / self.total().max(1) as f64
    }

    /// Denominator floored at 1, so no predicted positives gives 0
    pub fn precision(&self) -> f64 {
        self.tp as f64 / self.predicted_positives().max(1) as f64
    }

    /// Denominator floored at 1, so no actual positives gives 0
    pub fn recall(&self) -> f64 {
        self.tp as f64 / self.actual_positives().max(1) as f64
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    /// Rows `actual_0`, `actual_1`; columns `pred_0`, `pred_1`
    pub fn to_frame(&self) -> Result<DataFrame> {
        Ok(DataFrame::new(vec![
            Column::new("label".into(), &["actual_0", "actual_1"]),
            Column::new("pred_0".into(), &[self.tn as u64, self.fn_ as u64]),
            Column::new("pred_1".into(), &[self.fp as u64, self.tp as u64]),
        ])?)
    }
}

/// Headline classification metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Area under the ROC curve, from probabilities rather than labels
    pub roc_auc: f64,
}

impl ClassificationMetrics {
    /// Label metrics at `threshold`, AUC over the raw probabilities
    pub fn compute(y_true: &Array1<f64>, proba: &Array1<f64>, threshold: f64) -> Result<Self> {
        let cm = ConfusionMatrix::at_threshold(y_true, proba, threshold)?;
        let roc_auc = roc_curve(y_true, proba)?.auc();

        Ok(Self {
            accuracy: cm.accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            f1: cm.f1(),
            roc_auc,
        })
    }

    /// Single-row frame with columns `accuracy, precision, recall, f1, roc_auc`
    pub fn to_frame(&self) -> Result<DataFrame> {
        Ok(DataFrame::new(vec![
            Column::new("accuracy".into(), &[self.accuracy]),
            Column::new("precision".into(), &[self.precision]),
            Column::new("recall".into(), &[self.recall]),
            Column::new("f1".into(), &[self.f1]),
            Column::new("roc_auc".into(), &[self.roc_auc]),
        ])?)
    }
}

pub(crate) fn check_lengths(y_true: &Array1<f64>, proba: &Array1<f64>) -> Result<()> {
    if y_true.len() != proba.len() {
        return Err(CreditError::ShapeError {
            expected: format!("{} scores", y_true.len()),
            actual: format!("{} scores", proba.len()),
        });
    }
    Ok(())
}
