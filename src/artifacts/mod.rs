//! Artifact output
//!
//! Every file a run produces goes through an [`ArtifactSink`]. Tables arrive as
//! frames, figures as SVG text and documents as plain text; the sink decides
//! where they end up.

use crate::config::OutputLayout;
use crate::error::Result;
use crate::utils::{frame_to_csv_bytes, DataSaver};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const COEFFICIENTS_ODDS: &str = "coefficients_odds.csv";
pub const CONFUSION_MATRIX: &str = "confusion_matrix.csv";
pub const METRICS: &str = "metrics.csv";
pub const THRESHOLD_SWEEP: &str = "threshold_sweep.csv";
pub const PREDICTIONS: &str = "preds_test.csv";
pub const EDA_SUMMARY: &str = "eda_summary.csv";
pub const RUN_SUMMARY: &str = "run_summary.json";
pub const ROC_FIGURE: &str = "roc_curve.svg";
pub const SWEEP_FIGURE: &str = "threshold_sweep.svg";

/// Destination for run outputs
pub trait ArtifactSink {
    fn write_table(&mut self, name: &str, df: &mut DataFrame) -> Result<()>;

    fn write_figure(&mut self, name: &str, svg: &str) -> Result<()>;

    fn write_document(&mut self, name: &str, text: &str) -> Result<()>;
}

/// Writes tables and documents under `artifacts_dir` and figures under `figures_dir`
#[derive(Debug, Clone)]
pub struct DirectorySink {
    layout: OutputLayout,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Creates the figure and artifact directories up front
    pub fn new(layout: OutputLayout) -> Result<Self> {
        std::fs::create_dir_all(&layout.figures_dir)?;
        std::fs::create_dir_all(&layout.artifacts_dir)?;
        Ok(Self {
            layout,
            written: Vec::new(),
        })
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Paths written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn record(&mut self, path: PathBuf) {
        tracing::debug!(path = %path.display(), "artifact written");
        self.written.push(path);
    }
}

impl ArtifactSink for DirectorySink {
    fn write_table(&mut self, name: &str, df: &mut DataFrame) -> Result<()> {
        let path = self.layout.artifacts_dir.join(name);
        DataSaver::save_csv(df, &path)?;
        self.record(path);
        Ok(())
    }

    fn write_figure(&mut self, name: &str, svg: &str) -> Result<()> {
        let path = self.layout.figures_dir.join(name);
        std::fs::write(&path, svg)?;
        self.record(path);
        Ok(())
    }

    fn write_document(&mut self, name: &str, text: &str) -> Result<()> {
        let path = self.layout.artifacts_dir.join(name);
        std::fs::write(&path, text)?;
        self.record(path);
        Ok(())
    }
}

/// Keeps everything in memory; tables are kept as frames
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub tables: BTreeMap<String, DataFrame>,
    pub figures: BTreeMap<String, String>,
    pub documents: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&DataFrame> {
        self.tables.get(name)
    }

    pub fn figure(&self, name: &str) -> Option<&str> {
        self.figures.get(name).map(String::as_str)
    }

    pub fn document(&self, name: &str) -> Option<&str> {
        self.documents.get(name).map(String::as_str)
    }

    /// A stored table rendered as CSV text
    pub fn table_csv(&self, name: &str) -> Result<Option<String>> {
        match self.tables.get(name) {
            Some(df) => {
                let bytes = frame_to_csv_bytes(&mut df.clone())?;
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            None => Ok(None),
        }
    }
}

impl ArtifactSink for MemorySink {
    fn write_table(&mut self, name: &str, df: &mut DataFrame) -> Result<()> {
        self.tables.insert(name.to_string(), df.clone());
        Ok(())
    }

    fn write_figure(&mut self, name: &str, svg: &str) -> Result<()> {
        self.figures.insert(name.to_string(), svg.to_string());
        Ok(())
    }

    fn write_document(&mut self, name: &str, text: &str) -> Result<()> {
        self.documents.insert(name.to_string(), text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directory_sink_layout() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::under(dir.path());
        let mut sink = DirectorySink::new(layout.clone()).unwrap();

        let mut df = df! { "accuracy" => &[0.9] }.unwrap();
        sink.write_table(METRICS, &mut df).unwrap();
        sink.write_figure(ROC_FIGURE, "<svg></svg>").unwrap();
        sink.write_document(RUN_SUMMARY, "{}").unwrap();

        assert!(layout.artifacts_dir.join(METRICS).is_file());
        assert!(layout.figures_dir.join(ROC_FIGURE).is_file());
        assert!(layout.artifacts_dir.join(RUN_SUMMARY).is_file());
        assert_eq!(sink.written().len(), 3);

        let csv = std::fs::read_to_string(layout.artifacts_dir.join(METRICS)).unwrap();
        assert_eq!(csv.lines().next(), Some("accuracy"));
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        let mut df = df! { "a" => &[1, 2] }.unwrap();
        sink.write_table("t.csv", &mut df).unwrap();
        sink.write_figure("f.svg", "<svg/>").unwrap();

        assert_eq!(sink.table("t.csv").map(|t| t.height()), Some(2));
        assert_eq!(sink.figure("f.svg"), Some("<svg/>"));
        assert!(sink.document("missing").is_none());
        assert_eq!(sink.table_csv("t.csv").unwrap().as_deref(), Some("a\n1\n2\n"));
    }
}
