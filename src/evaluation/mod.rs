//! Model evaluation
//!
//! Scores held-out predictions: point metrics at a fixed threshold, the confusion
//! matrix, the ROC curve and a sweep over operating thresholds.

mod metrics;
mod roc;
mod threshold;

pub use metrics::{ClassificationMetrics, ConfusionMatrix};
pub use roc::{roc_curve, RocCurve, RocPoint};
pub use threshold::{sweep_frame, sweep_thresholds, threshold_sweep, SweepRow, SWEEP_END, SWEEP_START, SWEEP_STEPS};

use crate::error::Result;
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Default operating threshold
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Everything computed for one scored set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub threshold: f64,
    pub metrics: ClassificationMetrics,
    pub confusion: ConfusionMatrix,
    #[serde(skip)]
    pub roc: RocCurve,
    pub sweep: Vec<SweepRow>,
}

/// Scores predicted probabilities against ground truth
#[derive(Debug, Clone)]
pub struct Evaluator {
    threshold: f64,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Use a different operating threshold for the point metrics
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn evaluate(&self, y_true: &Array1<f64>, proba: &Array1<f64>) -> Result<EvaluationReport> {
        let confusion = ConfusionMatrix::at_threshold(y_true, proba, self.threshold)?;
        let metrics = ClassificationMetrics::compute(y_true, proba, self.threshold)?;
        let roc = roc_curve(y_true, proba)?;
        let sweep = threshold_sweep(y_true, proba)?;

        tracing::info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1,
            roc_auc = metrics.roc_auc,
            "evaluation complete"
        );

        Ok(EvaluationReport {
            threshold: self.threshold,
            metrics,
            confusion,
            roc,
            sweep,
        })
    }
}

/// Per-row predictions as `y_true, proba, pred`
pub fn predictions_frame(y_true: &Array1<f64>, proba: &Array1<f64>, threshold: f64) -> Result<DataFrame> {
    let truth: Vec<i32> = y_true.iter().map(|&v| v as i32).collect();
    let scores: Vec<f64> = proba.to_vec();
    let preds: Vec<i32> = proba.iter().map(|&p| i32::from(p >= threshold)).collect();

    Ok(DataFrame::new(vec![
        Column::new("y_true".into(), truth),
        Column::new("proba".into(), scores),
        Column::new("pred".into(), preds),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_evaluate_report() {
        let y = array![0.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        let p = array![0.1, 0.7, 0.8, 0.4, 0.9, 0.2];
        let report = Evaluator::new().evaluate(&y, &p).unwrap();

        assert_eq!(report.confusion.total(), 6);
        assert_eq!(report.sweep.len(), SWEEP_STEPS);
        assert!((report.metrics.roc_auc - report.roc.auc()).abs() < 1e-12);
        for value in [
            report.metrics.accuracy,
            report.metrics.precision,
            report.metrics.recall,
            report.metrics.f1,
            report.metrics.roc_auc,
        ] {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_custom_threshold() {
        let y = array![0.0, 1.0];
        let p = array![0.3, 0.4];
        let report = Evaluator::new().with_threshold(0.35).evaluate(&y, &p).unwrap();
        assert_eq!(report.metrics.accuracy, 1.0);
    }

    #[test]
    fn test_predictions_frame() {
        let y = array![0.0, 1.0, 1.0];
        let p = array![0.2, 0.5, 0.49];
        let frame = predictions_frame(&y, &p, 0.5).unwrap();

        assert_eq!(frame.shape(), (3, 3));
        let preds: Vec<Option<i32>> = frame.column("pred").unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(preds, vec![Some(0), Some(1), Some(0)]);
    }
}
