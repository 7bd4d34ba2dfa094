//! Missing value imputation strategies

use crate::error::{CreditError, Result};
use crate::utils::stats;
use super::{category_counts, most_frequent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the training median (numeric only)
    Median,
    /// Replace with the most frequent training value (categorical only)
    MostFrequent,
}

/// Fill value learned for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeValue {
    Numeric(f64),
    String(String),
}

/// Imputer for handling missing values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: BTreeMap<String, ImputeValue>,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: BTreeMap::new(),
        }
    }

    /// Fitted fill value for a column, if any
    pub fn fill_value(&self, column: &str) -> Option<&ImputeValue> {
        self.fill_values.get(column)
    }

    /// Learn the median of a numeric column
    pub fn fit_numeric(&mut self, column: &str, values: &[Option<f64>]) -> Result<&mut Self> {
        if self.strategy != ImputeStrategy::Median {
            return Err(CreditError::PreprocessingError(format!(
                "{:?} imputation does not apply to numeric column '{}'",
                self.strategy, column
            )));
        }

        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let median = stats::median(&present).ok_or_else(|| {
            CreditError::PreprocessingError(format!(
                "column '{}' has no observed values to impute from",
                column
            ))
        })?;

        self.fill_values.insert(column.to_string(), ImputeValue::Numeric(median));
        Ok(self)
    }

    /// Learn the most frequent category of a categorical column
    pub fn fit_categorical(&mut self, column: &str, values: &[Option<String>]) -> Result<&mut Self> {
        if self.strategy != ImputeStrategy::MostFrequent {
            return Err(CreditError::PreprocessingError(format!(
                "{:?} imputation does not apply to categorical column '{}'",
                self.strategy, column
            )));
        }

        let top = most_frequent(&category_counts(values)).ok_or_else(|| {
            CreditError::PreprocessingError(format!(
                "column '{}' has no observed values to impute from",
                column
            ))
        })?;

        self.fill_values.insert(column.to_string(), ImputeValue::String(top));
        Ok(self)
    }

    /// Replace missing numeric values with the fitted fill value
    pub fn impute_numeric(&self, column: &str, values: &[Option<f64>]) -> Result<Vec<f64>> {
        match self.fill_values.get(column) {
            Some(ImputeValue::Numeric(fill)) => {
                Ok(values.iter().map(|v| v.unwrap_or(*fill)).collect())
            }
            Some(ImputeValue::String(_)) => Err(CreditError::PreprocessingError(format!(
                "column '{}' was fitted as categorical",
                column
            ))),
            None => Err(CreditError::ModelNotFitted),
        }
    }

    /// Replace missing categorical values with the fitted fill value
    pub fn impute_categorical(&self, column: &str, values: &[Option<String>]) -> Result<Vec<String>> {
        match self.fill_values.get(column) {
            Some(ImputeValue::String(fill)) => Ok(values
                .iter()
                .map(|v| v.clone().unwrap_or_else(|| fill.clone()))
                .collect()),
            Some(ImputeValue::Numeric(_)) => Err(CreditError::PreprocessingError(format!(
                "column '{}' was fitted as numeric",
                column
            ))),
            None => Err(CreditError::ModelNotFitted),
        }
    }
}
