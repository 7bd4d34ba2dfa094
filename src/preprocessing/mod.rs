//! Data preprocessing module
//!
//! Turns raw applicant rows into a fixed-width numeric feature matrix:
//! - Missing value imputation (median for numeric, most frequent for categorical)
//! - Standard scaling fitted on training data only
//! - One-hot encoding with a vocabulary frozen at fit time
//!
//! Column handling is driven by an explicit [`ColumnKind`] schema decided once in
//! [`ColumnTransformer::fit`] and reused by every later transform.

mod config;
mod imputer;
mod scaler;
mod encoder;
mod pipeline;

pub use config::{PreprocessingConfig, UnknownCategoryPolicy};
pub use imputer::{Imputer, ImputeStrategy, ImputeValue};
pub use scaler::{ScalerParams, StandardScaler};
pub use encoder::OneHotEncoder;
pub use pipeline::ColumnTransformer;

use crate::error::{CreditError, Result};
use crate::utils::stats;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Schema tag for a raw input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    /// Classify a polars dtype. Integers and floats are numeric, strings and booleans
    /// are categorical, anything else is rejected.
    pub fn from_dtype(name: &str, dtype: &DataType) -> Result<Self> {
        match dtype {
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 |
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 |
            DataType::Float32 | DataType::Float64 => Ok(ColumnKind::Numeric),
            DataType::String | DataType::Boolean => Ok(ColumnKind::Categorical),
            other => Err(CreditError::UnsupportedColumn {
                name: name.to_string(),
                dtype: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// One entry of the fitted input schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
}

/// Classify every column of `df`, preserving column order.
pub fn infer_schema(df: &DataFrame) -> Result<Vec<ColumnSchema>> {
    df.get_columns()
        .iter()
        .map(|col| {
            let name = col.name().to_string();
            let kind = ColumnKind::from_dtype(&name, col.dtype())?;
            Ok(ColumnSchema { name, kind })
        })
        .collect()
}

/// Read a column as optional f64 values. Nulls and NaN both count as missing.
pub(crate) fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| CreditError::FeatureNotFound(name.to_string()))?;
    let casted = column.as_materialized_series().cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(ca.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect())
}

/// Read a column as optional strings.
pub(crate) fn categorical_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| CreditError::FeatureNotFound(name.to_string()))?;
    let casted = column.as_materialized_series().cast(&DataType::String)?;
    let ca = casted.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Descriptive statistics for one raw column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub kind: ColumnKind,
    pub count: usize,
    pub null_count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    pub unique_count: Option<usize>,
    pub top: Option<String>,
}

impl FeatureStats {
    /// Create empty feature statistics
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            count: 0,
            null_count: 0,
            mean: None,
            std: None,
            min: None,
            max: None,
            median: None,
            unique_count: None,
            top: None,
        }
    }

    /// Compute statistics from numeric values
    pub fn from_numeric(name: &str, values: &[Option<f64>]) -> Self {
        let mut stats = Self::new(name, ColumnKind::Numeric);
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        stats.count = present.len();
        stats.null_count = values.len() - present.len();

        if let Some((mean, _)) = stats::mean_std(&present) {
            stats.mean = Some(mean);
        }
        stats.std = stats::sample_std(&present);
        stats.min = present.iter().copied().reduce(f64::min);
        stats.max = present.iter().copied().reduce(f64::max);
        stats.median = stats::median(&present);
        stats
    }

    /// Compute statistics from categorical values
    pub fn from_categorical(name: &str, values: &[Option<String>]) -> Self {
        let mut stats = Self::new(name, ColumnKind::Categorical);
        let counts = category_counts(values);
        stats.count = counts.values().sum();
        stats.null_count = values.len() - stats.count;
        stats.unique_count = Some(counts.len());
        stats.top = most_frequent(&counts);
        stats
    }
}

/// Count category occurrences, skipping missing values. Keys come back sorted.
pub(crate) fn category_counts(values: &[Option<String>]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    counts
}

/// Most frequent key; ties resolve to the lexicographically smallest.
pub(crate) fn most_frequent(counts: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (key, &count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, _)| key.clone())
}
