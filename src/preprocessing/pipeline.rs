//! Column-wise preprocessing pipeline

use crate::error::{CreditError, Result};
use super::{
    categorical_values, infer_schema, numeric_values,
    config::PreprocessingConfig,
    encoder::OneHotEncoder,
    imputer::{ImputeStrategy, Imputer},
    scaler::StandardScaler,
    ColumnKind, ColumnSchema,
};
use ndarray::{s, Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Fitted transform from raw applicant columns to a numeric feature matrix.
///
/// Output layout is numeric columns first (input order), then one indicator per
/// category for each categorical column (input order, categories sorted). The layout
/// is frozen by [`fit`](Self::fit); a fitted transformer cannot be refitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    config: PreprocessingConfig,
    schema: Vec<ColumnSchema>,
    numeric_imputer: Imputer,
    categorical_imputer: Imputer,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    feature_names: Vec<String>,
    is_fitted: bool,
}

impl Default for ColumnTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnTransformer {
    /// Create a new transformer with default configuration
    pub fn new() -> Self {
        Self::with_config(PreprocessingConfig::default())
    }

    /// Create a new transformer with custom configuration
    pub fn with_config(config: PreprocessingConfig) -> Self {
        Self {
            numeric_imputer: Imputer::new(ImputeStrategy::Median),
            categorical_imputer: Imputer::new(ImputeStrategy::MostFrequent),
            scaler: StandardScaler::new(config.zero_variance_tol),
            encoder: OneHotEncoder::new(config.unknown_categories),
            config,
            schema: Vec::new(),
            feature_names: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit imputers, scaler and encoder on the training features
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        if self.is_fitted {
            return Err(CreditError::AlreadyFitted);
        }
        if df.height() == 0 || df.width() == 0 {
            return Err(CreditError::PreprocessingError(
                "cannot fit on an empty frame".to_string(),
            ));
        }

        let start = Instant::now();
        let schema = infer_schema(df)?;

        for col in schema.iter().filter(|c| c.kind == ColumnKind::Numeric) {
            let raw = numeric_values(df, &col.name)?;
            self.numeric_imputer.fit_numeric(&col.name, &raw)?;
            let filled = self.numeric_imputer.impute_numeric(&col.name, &raw)?;
            self.scaler.fit_column(&col.name, &filled)?;
        }

        for col in schema.iter().filter(|c| c.kind == ColumnKind::Categorical) {
            let raw = categorical_values(df, &col.name)?;
            self.categorical_imputer.fit_categorical(&col.name, &raw)?;
            let filled = self.categorical_imputer.impute_categorical(&col.name, &raw)?;
            self.encoder.fit_column(&col.name, &filled)?;
        }

        self.feature_names = schema
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .map(|c| c.name.clone())
            .chain(self.encoder.feature_names())
            .collect();
        self.schema = schema;
        self.is_fitted = true;

        tracing::debug!(
            rows = df.height(),
            numeric = self.numeric_columns().count(),
            categorical = self.categorical_columns().count(),
            features = self.feature_names.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fitted column transformer"
        );
        Ok(self)
    }

    /// Transform raw features with the fitted state
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(CreditError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut out = Array2::zeros((n_rows, self.feature_names.len()));
        let mut offset = 0;

        for col in self.numeric_columns() {
            self.check_kind(df, col)?;
            let raw = numeric_values(df, &col.name)?;
            let mut filled = self.numeric_imputer.impute_numeric(&col.name, &raw)?;
            self.scaler.transform_column(&col.name, &mut filled)?;
            out.column_mut(offset).assign(&Array1::from(filled));
            offset += 1;
        }

        for col in self.categorical_columns() {
            self.check_kind(df, col)?;
            let raw = categorical_values(df, &col.name)?;
            let filled = self.categorical_imputer.impute_categorical(&col.name, &raw)?;
            let width = self.encoder.width(&col.name)?;
            let unknown = self.encoder.encode_into(
                &col.name,
                &filled,
                out.slice_mut(s![.., offset..offset + width]),
            )?;
            if unknown > 0 {
                tracing::warn!(
                    column = %col.name,
                    rows = unknown,
                    "unseen categories encoded as all-zero indicators"
                );
            }
            offset += width;
        }

        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Output feature names, aligned with transform columns
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Input schema decided at fit time
    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    fn numeric_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.schema.iter().filter(|c| c.kind == ColumnKind::Numeric)
    }

    fn categorical_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.schema.iter().filter(|c| c.kind == ColumnKind::Categorical)
    }

    fn check_kind(&self, df: &DataFrame, col: &ColumnSchema) -> Result<()> {
        let column = df
            .column(&col.name)
            .map_err(|_| CreditError::FeatureNotFound(col.name.clone()))?;
        let kind = ColumnKind::from_dtype(&col.name, column.dtype())?;
        if kind != col.kind {
            return Err(CreditError::PreprocessingError(format!(
                "column '{}' was fitted as {} but is now {}",
                col.name, col.kind, kind
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::UnknownCategoryPolicy;

    fn create_test_df() -> DataFrame {
        df!(
            "age" => &[Some(25.0), Some(35.0), None, Some(45.0)],
            "region" => &[Some("NA"), Some("EU"), Some("NA"), None],
            "loans" => &[0i64, 1, 2, 1]
        )
        .unwrap()
    }

    #[test]
    fn test_fit_builds_feature_names() {
        let mut transformer = ColumnTransformer::new();
        transformer.fit(&create_test_df()).unwrap();

        assert!(transformer.is_fitted());
        assert_eq!(
            transformer.feature_names(),
            &["age", "loans", "region_EU", "region_NA"]
        );
    }

    #[test]
    fn test_transform_imputes_and_scales() {
        let df = create_test_df();
        let mut transformer = ColumnTransformer::new();
        let out = transformer.fit_transform(&df).unwrap();

        assert_eq!(out.dim(), (4, 4));
        // Imputed age equals the median, which scales to (35 - mean) / std.
        let params = transformer.scaler().params("age").unwrap();
        let expected = (35.0 - params.center) / params.scale;
        assert!((out[[2, 0]] - expected).abs() < 1e-12);
        // Missing region takes the most frequent value.
        assert_eq!(out.row(3).slice(s![2..]).to_vec(), vec![0.0, 1.0]);
        // Scaled columns have zero mean.
        assert!(out.column(1).sum().abs() < 1e-9);
    }

    #[test]
    fn test_transform_before_fit() {
        let transformer = ColumnTransformer::new();
        let result = transformer.transform(&create_test_df());
        assert!(matches!(result, Err(CreditError::ModelNotFitted)));
    }

    #[test]
    fn test_refit_rejected() {
        let df = create_test_df();
        let mut transformer = ColumnTransformer::new();
        transformer.fit(&df).unwrap();
        assert!(matches!(transformer.fit(&df), Err(CreditError::AlreadyFitted)));
    }

    #[test]
    fn test_missing_column_at_transform() {
        let mut transformer = ColumnTransformer::new();
        transformer.fit(&create_test_df()).unwrap();

        let partial = df!("age" => &[30.0], "loans" => &[1i64]).unwrap();
        let result = transformer.transform(&partial);
        assert!(matches!(result, Err(CreditError::FeatureNotFound(_))));
    }

    #[test]
    fn test_kind_change_rejected() {
        let mut transformer = ColumnTransformer::new();
        transformer.fit(&create_test_df()).unwrap();

        let changed = df!(
            "age" => &["old"],
            "region" => &["NA"],
            "loans" => &[1i64]
        )
        .unwrap();
        let result = transformer.transform(&changed);
        assert!(matches!(result, Err(CreditError::PreprocessingError(_))));
    }

    #[test]
    fn test_unknown_category_error_policy() {
        let config = PreprocessingConfig::new().with_unknown_categories(UnknownCategoryPolicy::Error);
        let mut transformer = ColumnTransformer::with_config(config);
        transformer.fit(&create_test_df()).unwrap();

        let batch = df!(
            "age" => &[30.0],
            "region" => &["LATAM"],
            "loans" => &[1i64]
        )
        .unwrap();
        assert!(matches!(
            transformer.transform(&batch),
            Err(CreditError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_unsupported_dtype_rejected() {
        let dates = Series::new("day".into(), &[1i32, 2])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![dates.into()]).unwrap();
        let mut transformer = ColumnTransformer::new();
        assert!(matches!(
            transformer.fit(&df),
            Err(CreditError::UnsupportedColumn { .. })
        ));
    }
}
