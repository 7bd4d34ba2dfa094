//! End-to-end workflow: load, explore, split, fit, evaluate, export

use crate::artifacts::{self, ArtifactSink};
use crate::config::{DataSource, PipelineConfig};
use crate::eda::EdaReport;
use crate::error::{CreditError, Result};
use crate::evaluation::{
    predictions_frame, sweep_frame, ClassificationMetrics, ConfusionMatrix, EvaluationReport, Evaluator, SweepRow,
};
use crate::synthetic::CreditDataGenerator;
use crate::training::{odds_frame, ApprovalModel, FitReport, StratifiedSplitter};
use crate::utils::{DataLoader, Timer};
use crate::visualization::{line_chart, Series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// What a run did, written as `run_summary.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub config: PipelineConfig,
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub fit_report: Option<FitReport>,
    pub threshold: f64,
    pub metrics: ClassificationMetrics,
    pub confusion: ConfusionMatrix,
    pub threshold_sweep: Vec<SweepRow>,
    /// Number of EDA figures rendered; zero when EDA is disabled
    pub eda_figures: usize,
    pub elapsed_secs: f64,
}

/// Runs the full workflow for one [`PipelineConfig`]
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    config: PipelineConfig,
}

impl PipelineRunner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Produce the input frame, generating or reading it as configured
    pub fn load_data(&self) -> Result<DataFrame> {
        match &self.config.source {
            DataSource::Synthetic { rows } => {
                let generator = CreditDataGenerator::new(*rows).with_seed(self.config.random_state);
                tracing::info!(rows = generator.rows(), seed = generator.seed(), "generating synthetic data");
                generator.generate()
            }
            DataSource::Csv { path } => DataLoader::new().load_csv(path),
        }
    }

    pub fn run(&self, sink: &mut dyn ArtifactSink) -> Result<RunSummary> {
        let timer = Timer::start();
        let config = &self.config;
        config.validate()?;

        let df = self.load_data()?;
        let target = config.target.as_str();
        if df.column(target).is_err() {
            return Err(CreditError::TargetNotFound(target.to_string()));
        }
        tracing::info!(rows = df.height(), columns = df.width(), "data ready");

        let eda_figures = if config.run_eda {
            self.run_eda(&df, sink)?
        } else {
            tracing::debug!("EDA disabled");
            0
        };

        let split = StratifiedSplitter::new()
            .with_test_size(config.test_size)
            .with_random_state(config.random_state)
            .split(&df, target)?;
        tracing::info!(train = split.y_train.len(), test = split.y_test.len(), "split complete");

        let mut model = ApprovalModel::new(config.preprocessing.clone(), config.model.clone());
        model.fit(&split.x_train, &split.y_train)?;

        let odds = model.odds_table()?;
        sink.write_table(artifacts::COEFFICIENTS_ODDS, &mut odds_frame(&odds)?)?;

        let proba = model.predict_proba(&split.x_test)?;
        let evaluator = Evaluator::new();
        let report = evaluator.evaluate(&split.y_test, &proba)?;
        self.write_evaluation(&report, sink)?;

        sink.write_table(
            artifacts::PREDICTIONS,
            &mut predictions_frame(&split.y_test, &proba, evaluator.threshold())?,
        )?;

        let summary = RunSummary {
            config: config.clone(),
            n_rows: df.height(),
            n_train: split.y_train.len(),
            n_test: split.y_test.len(),
            n_features: model.feature_names().len(),
            feature_names: model.feature_names().to_vec(),
            fit_report: model.fit_report().copied(),
            threshold: report.threshold,
            metrics: report.metrics,
            confusion: report.confusion,
            threshold_sweep: report.sweep,
            eda_figures,
            elapsed_secs: timer.elapsed_secs(),
        };
        sink.write_document(artifacts::RUN_SUMMARY, &serde_json::to_string_pretty(&summary)?)?;

        tracing::info!(
            roc_auc = summary.metrics.roc_auc,
            elapsed_secs = summary.elapsed_secs,
            "run complete"
        );
        Ok(summary)
    }

    fn run_eda(&self, df: &DataFrame, sink: &mut dyn ArtifactSink) -> Result<usize> {
        let report = EdaReport::compute(df, &self.config.target)?;
        sink.write_table(artifacts::EDA_SUMMARY, &mut report.summary_frame()?)?;

        let figures = report.render()?;
        for (name, svg) in &figures {
            sink.write_figure(name, svg)?;
        }
        tracing::info!(figures = figures.len(), "EDA figures written");
        Ok(figures.len())
    }

    fn write_evaluation(&self, report: &EvaluationReport, sink: &mut dyn ArtifactSink) -> Result<()> {
        sink.write_table(artifacts::METRICS, &mut report.metrics.to_frame()?)?;
        sink.write_table(artifacts::CONFUSION_MATRIX, &mut report.confusion.to_frame()?)?;
        sink.write_table(artifacts::THRESHOLD_SWEEP, &mut sweep_frame(&report.sweep)?)?;

        let roc = line_chart(
            "ROC Curve",
            "False positive rate",
            "True positive rate",
            &[
                Series::new(format!("ROC (AUC = {:.3})", report.metrics.roc_auc), report.roc.coordinates()),
                Series::new("chance", vec![(0.0, 0.0), (1.0, 1.0)]),
            ],
            0.0..1.0,
            0.0..1.0,
        )?;
        sink.write_figure(artifacts::ROC_FIGURE, &roc)?;

        let column = |f: fn(&SweepRow) -> f64| report.sweep.iter().map(|r| (r.threshold, f(r))).collect::<Vec<_>>();
        let sweep = line_chart(
            "Threshold Sweep",
            "threshold",
            "score",
            &[
                Series::new("accuracy", column(|r| r.accuracy)),
                Series::new("precision", column(|r| r.precision)),
                Series::new("recall", column(|r| r.recall)),
            ],
            0.0..1.0,
            0.0..1.05,
        )?;
        sink.write_figure(artifacts::SWEEP_FIGURE, &sweep)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::MemorySink;
    use std::path::PathBuf;

    #[test]
    fn test_small_run_without_eda() {
        let config = PipelineConfig::new()
            .with_source(DataSource::Synthetic { rows: 1500 })
            .with_eda(false);
        let mut sink = MemorySink::new();
        let summary = PipelineRunner::new(config).run(&mut sink).unwrap();

        assert_eq!(summary.n_rows, 1500);
        assert_eq!(summary.n_test, 300);
        assert_eq!(summary.n_train + summary.n_test, 1500);
        assert_eq!(summary.eda_figures, 0);
        assert!(sink.figures.keys().all(|k| k == artifacts::ROC_FIGURE || k == artifacts::SWEEP_FIGURE));
        assert!(sink.table(artifacts::EDA_SUMMARY).is_none());
        assert!(sink.document(artifacts::RUN_SUMMARY).is_some());
    }

    #[test]
    fn test_missing_target_fails_before_writing() {
        let config = PipelineConfig::new()
            .with_source(DataSource::Synthetic { rows: 200 })
            .with_target("label");
        let mut sink = MemorySink::new();
        let err = PipelineRunner::new(config).run(&mut sink).unwrap_err();

        assert!(matches!(err, CreditError::TargetNotFound(ref t) if t == "label"));
        assert!(sink.tables.is_empty() && sink.figures.is_empty());
    }

    #[test]
    fn test_missing_csv_is_fatal() {
        let config = PipelineConfig::new().with_source(DataSource::Csv {
            path: PathBuf::from("/nonexistent/credit.csv"),
        });
        let err = PipelineRunner::new(config).run(&mut MemorySink::new()).unwrap_err();
        assert!(matches!(err, CreditError::InputNotFound(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig::new().with_test_size(1.5);
        assert!(PipelineRunner::new(config).run(&mut MemorySink::new()).is_err());
    }
}
