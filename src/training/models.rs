//! Preprocessor + classifier as one fit/predict unit

use crate::error::{CreditError, Result};
use crate::preprocessing::{ColumnTransformer, PreprocessingConfig};
use super::config::ModelConfig;
use super::linear_models::{FitReport, LogisticRegression};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One row of the coefficient/odds table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    pub feature: String,
    pub coef: f64,
    /// `exp(coef)`: multiplicative change in approval odds per unit of the
    /// standardized (or indicator) feature
    pub odds_ratio: f64,
}

/// Credit-approval model: a [`ColumnTransformer`] feeding a [`LogisticRegression`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalModel {
    preprocessor: ColumnTransformer,
    classifier: LogisticRegression,
}

impl ApprovalModel {
    /// Create an unfitted model
    pub fn new(preprocessing: PreprocessingConfig, model: ModelConfig) -> Self {
        Self {
            preprocessor: ColumnTransformer::with_config(preprocessing),
            classifier: LogisticRegression::with_config(model),
        }
    }

    /// Fit the preprocessor on raw training features, then the classifier on the
    /// transformed matrix
    pub fn fit(&mut self, x: &DataFrame, y: &Array1<f64>) -> Result<&mut Self> {
        if x.height() != y.len() {
            return Err(CreditError::ShapeError {
                expected: format!("{} labels", x.height()),
                actual: format!("{} labels", y.len()),
            });
        }

        let features = self.preprocessor.fit_transform(x)?;
        self.classifier.fit(&features, y)?;

        if let Some(report) = self.classifier.fit_report() {
            tracing::info!(
                features = features.ncols(),
                iterations = report.n_iter,
                converged = report.converged,
                "model fitted"
            );
        }
        Ok(self)
    }

    /// Probability of approval for each raw row
    pub fn predict_proba(&self, x: &DataFrame) -> Result<Array1<f64>> {
        let features = self.preprocessor.transform(x)?;
        self.classifier.predict_proba(&features)
    }

    /// 0/1 labels at the given operating threshold
    pub fn predict(&self, x: &DataFrame, threshold: f64) -> Result<Array1<f64>> {
        let features = self.preprocessor.transform(x)?;
        self.classifier.predict(&features, threshold)
    }

    pub fn feature_names(&self) -> &[String] {
        self.preprocessor.feature_names()
    }

    pub fn fit_report(&self) -> Option<&FitReport> {
        self.classifier.fit_report()
    }

    /// Coefficients and odds ratios, one row per output feature, sorted by
    /// descending odds ratio
    pub fn odds_table(&self) -> Result<Vec<CoefficientRow>> {
        let coefficients = self
            .classifier
            .coefficients
            .as_ref()
            .ok_or(CreditError::ModelNotFitted)?;
        let names = self.preprocessor.feature_names();
        if names.len() != coefficients.len() {
            return Err(CreditError::ShapeError {
                expected: format!("{} coefficients", names.len()),
                actual: format!("{} coefficients", coefficients.len()),
            });
        }

        let mut rows: Vec<CoefficientRow> = names
            .iter()
            .zip(coefficients.iter())
            .map(|(feature, &coef)| CoefficientRow {
                feature: feature.clone(),
                coef,
                odds_ratio: coef.exp(),
            })
            .collect();
        rows.sort_by(|a, b| b.odds_ratio.total_cmp(&a.odds_ratio));
        Ok(rows)
    }
}

/// Odds table as a frame with columns `feature, coef, odds_ratio`
pub fn odds_frame(rows: &[CoefficientRow]) -> Result<DataFrame> {
    let feature: Vec<&str> = rows.iter().map(|r| r.feature.as_str()).collect();
    let coef: Vec<f64> = rows.iter().map(|r| r.coef).collect();
    let odds: Vec<f64> = rows.iter().map(|r| r.odds_ratio).collect();

    Ok(DataFrame::new(vec![
        Column::new("feature".into(), feature),
        Column::new("coef".into(), coef),
        Column::new("odds_ratio".into(), odds),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_frame() -> (DataFrame, Array1<f64>) {
        let income: Vec<f64> = (0..40).map(|i| 20_000.0 + 2_000.0 * i as f64).collect();
        let region: Vec<&str> = (0..40).map(|i| if i % 3 == 0 { "EU" } else { "NA" }).collect();
        let y: Array1<f64> = (0..40)
            .map(|i| if (i >= 18 && i != 25) || i == 5 { 1.0 } else { 0.0 })
            .collect();
        let df = df!("income" => &income, "region" => &region).unwrap();
        (df, y)
    }

    #[test]
    fn test_fit_and_predict() {
        let (df, y) = training_frame();
        let mut model = ApprovalModel::new(PreprocessingConfig::default(), ModelConfig::default());
        model.fit(&df, &y).unwrap();

        assert_eq!(model.feature_names(), &["income", "region_EU", "region_NA"]);
        let proba = model.predict_proba(&df).unwrap();
        assert_eq!(proba.len(), 40);
        assert!(proba[39] > proba[0]);

        let labels = model.predict(&df, 0.5).unwrap();
        assert!(labels.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_odds_table_sorted_and_complete() {
        let (df, y) = training_frame();
        let mut model = ApprovalModel::new(PreprocessingConfig::default(), ModelConfig::default());
        model.fit(&df, &y).unwrap();

        let table = model.odds_table().unwrap();
        assert_eq!(table.len(), model.feature_names().len());
        assert!(table.windows(2).all(|w| w[0].odds_ratio >= w[1].odds_ratio));
        assert_eq!(table[0].feature, "income");
        for row in &table {
            assert!((row.odds_ratio - row.coef.exp()).abs() < 1e-12);
        }

        let frame = odds_frame(&table).unwrap();
        assert_eq!(frame.height(), 3);
        let names: Vec<&str> = frame.get_column_names().into_iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["feature", "coef", "odds_ratio"]);
    }

    #[test]
    fn test_odds_table_before_fit() {
        let model = ApprovalModel::new(PreprocessingConfig::default(), ModelConfig::default());
        assert!(matches!(model.odds_table(), Err(CreditError::ModelNotFitted)));
    }

    #[test]
    fn test_label_length_mismatch() {
        let (df, _) = training_frame();
        let mut model = ApprovalModel::new(PreprocessingConfig::default(), ModelConfig::default());
        let result = model.fit(&df, &Array1::zeros(3));
        assert!(matches!(result, Err(CreditError::ShapeError { .. })));
    }
}
