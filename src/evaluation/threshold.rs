//! Operating-threshold sweep

use crate::error::Result;
use super::metrics::ConfusionMatrix;
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const SWEEP_START: f64 = 0.1;
pub const SWEEP_END: f64 = 0.9;
pub const SWEEP_STEPS: usize = 17;

/// Scores of the classifier at one threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub threshold: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub pred_positives: usize,
}

/// Evenly spaced thresholds from 0.10 to 0.90 inclusive, rounded to 3 decimals
pub fn sweep_thresholds() -> Vec<f64> {
    let step = (SWEEP_END - SWEEP_START) / (SWEEP_STEPS - 1) as f64;
    (0..SWEEP_STEPS)
        .map(|i| ((SWEEP_START + step * i as f64) * 1000.0).round() / 1000.0)
        .collect()
}

/// Accuracy, precision, recall and predicted-positive count at each sweep threshold
pub fn threshold_sweep(y_true: &Array1<f64>, proba: &Array1<f64>) -> Result<Vec<SweepRow>> {
    sweep_thresholds()
        .into_iter()
        .map(|threshold| {
            let cm = ConfusionMatrix::at_threshold(y_true, proba, threshold)?;
            Ok(SweepRow {
                threshold,
                accuracy: cm.accuracy(),
                precision: cm.precision(),
                recall: cm.recall(),
                pred_positives: cm.predicted_positives(),
            })
        })
        .collect()
}

/// Sweep as a frame with columns `threshold, accuracy, precision, recall, pred_positives`
pub fn sweep_frame(rows: &[SweepRow]) -> Result<DataFrame> {
    let column = |name: &str, f: fn(&SweepRow) -> f64| {
        Column::new(name.into(), rows.iter().map(f).collect::<Vec<f64>>())
    };
    let positives: Vec<u64> = rows.iter().map(|r| r.pred_positives as u64).collect();

    Ok(DataFrame::new(vec![
        column("threshold", |r| r.threshold),
        column("accuracy", |r| r.accuracy),
        column("precision", |r| r.precision),
        column("recall", |r| r.recall),
        Column::new("pred_positives".into(), positives),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_thresholds() {
        let thresholds = sweep_thresholds();
        assert_eq!(thresholds.len(), 17);
        assert_eq!(thresholds[0], 0.1);
        assert_eq!(thresholds[1], 0.15);
        assert_eq!(thresholds[8], 0.5);
        assert_eq!(thresholds[16], 0.9);
    }

    #[test]
    fn test_sweep_monotone_positives() {
        let y = array![0.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        let p = array![0.05, 0.3, 0.55, 0.7, 0.95, 0.62];
        let rows = threshold_sweep(&y, &p).unwrap();

        assert_eq!(rows.len(), 17);
        assert_eq!(rows[0].pred_positives, 5);
        assert_eq!(rows[16].pred_positives, 1);
        assert!(rows.windows(2).all(|w| w[0].pred_positives >= w[1].pred_positives));
        assert_eq!(rows[16].precision, 1.0);
    }

    #[test]
    fn test_sweep_no_positive_predictions() {
        let y = array![0.0, 1.0];
        let p = array![0.01, 0.02];
        let rows = threshold_sweep(&y, &p).unwrap();
        assert!(rows.iter().all(|r| r.precision == 0.0 && r.pred_positives == 0));
    }

    #[test]
    fn test_sweep_frame_columns() {
        let y = array![0.0, 1.0];
        let p = array![0.2, 0.8];
        let frame = sweep_frame(&threshold_sweep(&y, &p).unwrap()).unwrap();
        assert_eq!(frame.shape(), (17, 5));
        assert!(frame.column("pred_positives").is_ok());
    }
}
