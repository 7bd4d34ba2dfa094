//! Exploratory data analysis
//!
//! Column summaries, class balance and numeric correlations for the raw input
//! frame, plus the figures that go with them.

use crate::error::Result;
use crate::preprocessing::{categorical_values, infer_schema, numeric_values, ColumnKind, FeatureStats};
use crate::utils::stats;
use crate::visualization::{self, HISTOGRAM_BINS};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Box plots are drawn for at most this many numeric columns
pub const MAX_BOX_PLOTS: usize = 6;

/// Label used for missing target values in the class balance
const MISSING_LABEL: &str = "missing";

/// Summary of a raw dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaReport {
    pub n_rows: usize,
    pub stats: Vec<FeatureStats>,
    /// Rows per target value; `None` when the target column is absent
    pub class_balance: Option<BTreeMap<String, usize>>,
    /// Numeric columns other than the target, in frame order
    pub numeric_columns: Vec<String>,
    /// Pairwise-complete Pearson correlations, indexed like `numeric_columns`
    pub correlation: Vec<Vec<Option<f64>>>,
    target: String,
    #[serde(skip)]
    numeric_data: Vec<Vec<Option<f64>>>,
}

impl EdaReport {
    pub fn compute(df: &DataFrame, target: &str) -> Result<Self> {
        let schema = infer_schema(df)?;

        let mut summaries = Vec::with_capacity(schema.len());
        let mut numeric_columns = Vec::new();
        let mut numeric_data = Vec::new();
        for column in &schema {
            match column.kind {
                ColumnKind::Numeric => {
                    let values = numeric_values(df, &column.name)?;
                    summaries.push(FeatureStats::from_numeric(&column.name, &values));
                    if column.name != target {
                        numeric_columns.push(column.name.clone());
                        numeric_data.push(values);
                    }
                }
                ColumnKind::Categorical => {
                    let values = categorical_values(df, &column.name)?;
                    summaries.push(FeatureStats::from_categorical(&column.name, &values));
                }
            }
        }

        let class_balance = if df.column(target).is_ok() {
            let mut counts = BTreeMap::new();
            for value in categorical_values(df, target)? {
                let key = value.unwrap_or_else(|| MISSING_LABEL.to_string());
                *counts.entry(key).or_insert(0) += 1;
            }
            Some(counts)
        } else {
            tracing::debug!(column = %target, "target column absent, skipping class balance");
            None
        };

        let correlation = numeric_data
            .iter()
            .map(|a| numeric_data.iter().map(|b| stats::pearson(a, b)).collect())
            .collect();

        tracing::info!(
            rows = df.height(),
            columns = df.width(),
            numeric = numeric_columns.len(),
            "EDA summary computed"
        );

        Ok(Self {
            n_rows: df.height(),
            stats: summaries,
            class_balance,
            numeric_columns,
            correlation,
            target: target.to_string(),
            numeric_data,
        })
    }

    /// One row per column: `column, kind, count, missing, mean, std, min, median, max, unique, top`
    pub fn summary_frame(&self) -> Result<DataFrame> {
        let s = &self.stats;
        let opt_f64 = |f: fn(&FeatureStats) -> Option<f64>| s.iter().map(f).collect::<Vec<Option<f64>>>();

        Ok(DataFrame::new(vec![
            Column::new("column".into(), s.iter().map(|f| f.name.as_str()).collect::<Vec<_>>()),
            Column::new("kind".into(), s.iter().map(|f| f.kind.to_string()).collect::<Vec<_>>()),
            Column::new("count".into(), s.iter().map(|f| f.count as u64).collect::<Vec<_>>()),
            Column::new("missing".into(), s.iter().map(|f| f.null_count as u64).collect::<Vec<_>>()),
            Column::new("mean".into(), opt_f64(|f| f.mean)),
            Column::new("std".into(), opt_f64(|f| f.std)),
            Column::new("min".into(), opt_f64(|f| f.min)),
            Column::new("median".into(), opt_f64(|f| f.median)),
            Column::new("max".into(), opt_f64(|f| f.max)),
            Column::new("unique".into(), s.iter().map(|f| f.unique_count.map(|u| u as u64)).collect::<Vec<_>>()),
            Column::new("top".into(), s.iter().map(|f| f.top.clone()).collect::<Vec<_>>()),
        ])?)
    }

    /// Render every EDA figure as `(file name, svg)` pairs.
    ///
    /// Columns without a single present value are skipped.
    pub fn render(&self) -> Result<Vec<(String, String)>> {
        let mut figures = Vec::new();

        if let Some(balance) = &self.class_balance {
            let labels: Vec<String> = balance.keys().cloned().collect();
            let counts: Vec<f64> = balance.values().map(|&c| c as f64).collect();
            let svg = visualization::bar_chart("Class Balance", &self.target, "count", &labels, &counts)?;
            figures.push(("class_balance.svg".to_string(), svg));
        }

        for (i, (name, values)) in self.numeric_columns.iter().zip(&self.numeric_data).enumerate() {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            if present.is_empty() {
                tracing::warn!(column = %name, "no values to plot");
                continue;
            }

            let svg = visualization::histogram(&format!("Histogram of {}", name), name, &present, HISTOGRAM_BINS)?;
            figures.push((format!("hist_{}.svg", name), svg));

            if i < MAX_BOX_PLOTS {
                let svg = visualization::box_plot(&format!("Boxplot of {}", name), name, &present)?;
                figures.push((format!("box_{}.svg", name), svg));
            }
        }

        if !self.numeric_columns.is_empty() {
            let svg = visualization::heatmap(
                "Correlation (numeric features)",
                &self.numeric_columns,
                &self.correlation,
            )?;
            figures.push(("corr_numeric.svg".to_string(), svg));
        }

        Ok(figures)
    }

    pub fn column_stats(&self, name: &str) -> Option<&FeatureStats> {
        self.stats.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df! {
            "income" => &[Some(40000.0), Some(52000.0), None, Some(61000.0), Some(75000.0)],
            "age" => &[25.0, 31.0, 44.0, 38.0, 52.0],
            "region" => &[Some("NA"), Some("EU"), Some("NA"), None, Some("APAC")],
            "approved" => &[0i64, 1, 1, 0, 1],
        }
        .unwrap()
    }

    #[test]
    fn test_stats_and_balance() {
        let report = EdaReport::compute(&sample(), "approved").unwrap();

        assert_eq!(report.n_rows, 5);
        assert_eq!(report.stats.len(), 4);
        assert_eq!(report.numeric_columns, vec!["income".to_string(), "age".to_string()]);

        let income = report.column_stats("income").unwrap();
        assert_eq!(income.null_count, 1);
        assert_eq!(income.count, 4);

        let region = report.column_stats("region").unwrap();
        assert_eq!(region.unique_count, Some(3));
        assert_eq!(region.top.as_deref(), Some("NA"));

        let balance = report.class_balance.as_ref().unwrap();
        assert_eq!(balance.get("0"), Some(&2));
        assert_eq!(balance.get("1"), Some(&3));
    }

    #[test]
    fn test_missing_target_skips_balance() {
        let report = EdaReport::compute(&sample(), "label").unwrap();
        assert!(report.class_balance.is_none());
        // Without a target every numeric column is a feature
        assert_eq!(report.numeric_columns.len(), 3);
    }

    #[test]
    fn test_correlation_matrix() {
        let report = EdaReport::compute(&sample(), "approved").unwrap();
        let corr = &report.correlation;

        assert_eq!(corr.len(), 2);
        assert!((corr[0][0].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(corr[0][1], corr[1][0]);
    }

    #[test]
    fn test_summary_frame_shape() {
        let report = EdaReport::compute(&sample(), "approved").unwrap();
        let frame = report.summary_frame().unwrap();
        assert_eq!(frame.shape(), (4, 11));
    }

    #[test]
    fn test_render_figure_names() {
        let report = EdaReport::compute(&sample(), "approved").unwrap();
        let names: Vec<String> = report.render().unwrap().into_iter().map(|(name, _)| name).collect();

        assert_eq!(
            names,
            vec![
                "class_balance.svg",
                "hist_income.svg",
                "box_income.svg",
                "hist_age.svg",
                "box_age.svg",
                "corr_numeric.svg"
            ]
        );
    }
}
