//! Stratified train/test splitting

use crate::error::{CreditError, Result};
use ndarray::Array1;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row indices of a train/test partition, each sorted ascending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Features and labels of both partitions
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Label-stratified splitter with a fixed test fraction and seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratifiedSplitter {
    test_size: f64,
    random_state: u64,
}

impl Default for StratifiedSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl StratifiedSplitter {
    /// 80/20 split seeded with 42
    pub fn new() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
        }
    }

    /// Set the fraction of rows held out for testing
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Partition row indices so each class keeps its overall proportion.
    pub fn split_indices(&self, labels: &Array1<f64>) -> Result<SplitIndices> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(CreditError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }

        let n_samples = labels.len();
        let n_test = (self.test_size * n_samples as f64).ceil() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(CreditError::DataError(format!(
                "test_size {} leaves an empty partition for {} rows",
                self.test_size, n_samples
            )));
        }

        // Group samples by class, in sorted label order
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in labels.iter().enumerate() {
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }

        let counts: Vec<usize> = class_indices.values().map(Vec::len).collect();
        let test_counts = apportion(&counts, n_test);

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let mut train = Vec::with_capacity(n_samples - n_test);
        let mut test = Vec::with_capacity(n_test);

        for ((class, indices), &class_test) in class_indices.iter_mut().zip(test_counts.iter()) {
            let class_train = indices.len() - class_test;
            if class_test == 0 || class_train == 0 {
                return Err(CreditError::DataError(format!(
                    "stratified split leaves class {} with {} train and {} test samples",
                    class, class_train, class_test
                )));
            }

            indices.shuffle(&mut rng);
            test.extend_from_slice(&indices[..class_test]);
            train.extend_from_slice(&indices[class_test..]);
        }

        train.sort_unstable();
        test.sort_unstable();

        tracing::debug!(
            train = train.len(),
            test = test.len(),
            classes = class_indices.len(),
            "stratified split"
        );
        Ok(SplitIndices { train, test })
    }

    /// Split a frame on `target`, dropping the target from both feature frames.
    pub fn split(&self, df: &DataFrame, target: &str) -> Result<TrainTestSplit> {
        let y = extract_target(df, target)?;
        let indices = self.split_indices(&y)?;
        let features = df.drop(target)?;

        Ok(TrainTestSplit {
            x_train: take_rows(&features, &indices.train)?,
            x_test: take_rows(&features, &indices.test)?,
            y_train: indices.train.iter().map(|&i| y[i]).collect(),
            y_test: indices.test.iter().map(|&i| y[i]).collect(),
        })
    }
}

/// Read the target column as 0/1 labels.
///
/// Integer, float and boolean columns are accepted; nulls or values other than
/// 0 and 1 are rejected.
pub fn extract_target(df: &DataFrame, target: &str) -> Result<Array1<f64>> {
    let column = df
        .column(target)
        .map_err(|_| CreditError::TargetNotFound(target.to_string()))?;
    let casted = column.as_materialized_series().cast(&DataType::Float64)?;
    let ca = casted.f64()?;

    ca.into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(label) if label == 0.0 || label == 1.0 => Ok(label),
            Some(other) => Err(CreditError::DataError(format!(
                "target '{}' has non-binary value {} at row {}",
                target, other, row
            ))),
            None => Err(CreditError::DataError(format!(
                "target '{}' is missing or not numeric at row {}",
                target, row
            ))),
        })
        .collect()
}

/// Select rows by position
pub fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = rows.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}

/// Distribute `n_draws` across classes proportionally to `counts`:
/// floor each share, then hand out the remainder by largest fractional part
/// (ties go to the earlier class).
fn apportion(counts: &[usize], n_draws: usize) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    let shares: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * n_draws as f64 / total as f64)
        .collect();
    let mut alloc: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = shares[a] - shares[a].floor();
        let fb = shares[b] - shares[b].floor();
        fb.total_cmp(&fa)
    });

    let remaining = n_draws.saturating_sub(alloc.iter().sum());
    for &class in order.iter().take(remaining) {
        alloc[class] += 1;
    }
    alloc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_pos: usize, n_neg: usize) -> Array1<f64> {
        (0..n_pos + n_neg)
            .map(|i| if i < n_pos { 1.0 } else { 0.0 })
            .collect()
    }

    #[test]
    fn test_apportion_sums_to_draws() {
        assert_eq!(apportion(&[70, 30], 20), vec![14, 6]);
        assert_eq!(apportion(&[5, 5, 5], 4), vec![2, 1, 1]);
        assert_eq!(apportion(&[1, 99], 10).iter().sum::<usize>(), 10);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let y = labels(30, 70);
        let split = StratifiedSplitter::new().split_indices(&y).unwrap();

        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);

        let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_preserves_class_ratio() {
        let y = labels(30, 70);
        let split = StratifiedSplitter::new().split_indices(&y).unwrap();

        let test_pos = split.test.iter().filter(|&&i| y[i] == 1.0).count();
        let train_pos = split.train.iter().filter(|&&i| y[i] == 1.0).count();
        assert_eq!(test_pos, 6);
        assert_eq!(train_pos, 24);
    }

    #[test]
    fn test_split_is_reproducible() {
        let y = labels(40, 60);
        let a = StratifiedSplitter::new().with_random_state(7).split_indices(&y).unwrap();
        let b = StratifiedSplitter::new().with_random_state(7).split_indices(&y).unwrap();
        let c = StratifiedSplitter::new().with_random_state(8).split_indices(&y).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_test_size() {
        let y = labels(5, 5);
        for bad in [0.0, 1.0, -0.1, 1.5] {
            let result = StratifiedSplitter::new().with_test_size(bad).split_indices(&y);
            assert!(matches!(result, Err(CreditError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn test_rare_class_fails() {
        // One positive among ten rows cannot appear in both partitions.
        let y = labels(1, 9);
        let result = StratifiedSplitter::new().split_indices(&y);
        assert!(matches!(result, Err(CreditError::DataError(_))));
    }

    #[test]
    fn test_split_frame_drops_target() {
        let df = df!(
            "income" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
            "approved" => &[0i64, 1, 0, 1, 0, 1, 0, 1, 0, 1]
        )
        .unwrap();
        let split = StratifiedSplitter::new().split(&df, "approved").unwrap();

        assert_eq!(split.x_train.width(), 1);
        assert_eq!(split.x_train.height(), 8);
        assert_eq!(split.x_test.height(), 2);
        assert_eq!(split.y_test.sum(), 1.0);
    }

    #[test]
    fn test_missing_target() {
        let df = df!("income" => &[1.0, 2.0]).unwrap();
        let result = StratifiedSplitter::new().split(&df, "approved");
        assert!(matches!(result, Err(CreditError::TargetNotFound(_))));
    }

    #[test]
    fn test_non_binary_target() {
        let df = df!("approved" => &[0i64, 2, 1]).unwrap();
        assert!(matches!(extract_target(&df, "approved"), Err(CreditError::DataError(_))));

        let df = df!("approved" => &[true, false]).unwrap();
        assert_eq!(extract_target(&df, "approved").unwrap().to_vec(), vec![1.0, 0.0]);
    }
}
