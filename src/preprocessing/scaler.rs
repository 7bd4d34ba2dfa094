//! Standard (z-score) feature scaling

use crate::error::{CreditError, Result};
use crate::utils::stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters for one fitted column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Training mean
    pub center: f64,
    /// Training standard deviation, or 1.0 when the column is constant
    pub scale: f64,
}

/// Standard scaler: `(x - mean) / std`, with statistics from the training partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: BTreeMap<String, ScalerParams>,
    zero_variance_tol: f64,
}

impl StandardScaler {
    /// Create a new scaler. A column whose values are all equal, or whose standard
    /// deviation is at or below `zero_variance_tol` relative to `max(|mean|, 1)`,
    /// is left unscaled (only centred).
    pub fn new(zero_variance_tol: f64) -> Self {
        Self {
            params: BTreeMap::new(),
            zero_variance_tol,
        }
    }

    /// Fit one column from its imputed values
    pub fn fit_column(&mut self, column: &str, values: &[f64]) -> Result<&mut Self> {
        let (mean, std) = stats::mean_std(values).ok_or_else(|| {
            CreditError::PreprocessingError(format!("cannot scale empty column '{}'", column))
        })?;

        let (lo, hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        // The two-pass mean of a constant column still carries rounding error,
        // so constancy is decided on the raw values.
        let params = if lo == hi {
            tracing::debug!(column, value = lo, "constant column left unscaled");
            ScalerParams { center: lo, scale: 1.0 }
        } else if std <= self.zero_variance_tol * mean.abs().max(1.0) {
            tracing::debug!(column, std, "near-zero variance column left unscaled");
            ScalerParams { center: mean, scale: 1.0 }
        } else {
            ScalerParams { center: mean, scale: std }
        };

        self.params.insert(column.to_string(), params);
        Ok(self)
    }

    /// Fitted parameters for a column
    pub fn params(&self, column: &str) -> Option<&ScalerParams> {
        self.params.get(column)
    }

    /// Scale values in place
    pub fn transform_column(&self, column: &str, values: &mut [f64]) -> Result<()> {
        let params = self.params.get(column).ok_or(CreditError::ModelNotFitted)?;
        for v in values.iter_mut() {
            *v = (*v - params.center) / params.scale;
        }
        Ok(())
    }
}
