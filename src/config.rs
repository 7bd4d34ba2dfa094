//! Run configuration
//!
//! One [`PipelineConfig`] describes a whole run: where the data comes from, how it
//! is split, the model hyper-parameters and where outputs land.

use crate::error::{CreditError, Result};
use crate::preprocessing::PreprocessingConfig;
use crate::training::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the input rows come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DataSource {
    /// Generate `rows` synthetic applications
    Synthetic { rows: usize },
    /// Read a headered CSV file
    Csv { path: PathBuf },
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Synthetic { rows: 4000 }
    }
}

/// File name of the generated dataset inside `data_dir`
pub const DATASET_FILE: &str = "credit.csv";

/// Output directories for figures, tabular artifacts and data files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLayout {
    pub figures_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::under(".")
    }
}

impl OutputLayout {
    /// `figures/`, `artifacts/` and `data/` under `root`
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            figures_dir: root.join("figures"),
            artifacts_dir: root.join("artifacts"),
            data_dir: root.join("data"),
        }
    }

    /// Where a generated dataset is written, and read back in CSV mode by default
    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(DATASET_FILE)
    }
}

/// Configuration for a full run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: DataSource,
    /// Label column name
    pub target: String,
    /// Held-out fraction, strictly between 0 and 1
    pub test_size: f64,
    /// Seeds both synthetic generation and the split
    pub random_state: u64,
    pub model: ModelConfig,
    pub preprocessing: PreprocessingConfig,
    pub output: OutputLayout,
    pub run_eda: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: DataSource::default(),
            target: "approved".to_string(),
            test_size: 0.2,
            random_state: 42,
            model: ModelConfig::default(),
            preprocessing: PreprocessingConfig::default(),
            output: OutputLayout::default(),
            run_eda: true,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    pub fn with_output(mut self, output: OutputLayout) -> Self {
        self.output = output;
        self
    }

    pub fn with_eda(mut self, run_eda: bool) -> Self {
        self.run_eda = run_eda;
        self
    }

    /// Reject settings that would fail later in the run
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(CreditError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }
        if self.target.trim().is_empty() {
            return Err(CreditError::ConfigError("target column name is empty".to_string()));
        }
        if let DataSource::Synthetic { rows } = self.source {
            if rows < 2 {
                return Err(CreditError::InvalidParameter {
                    name: "rows".to_string(),
                    value: rows.to_string(),
                    reason: "need at least 2 rows to split".to_string(),
                });
            }
        }
        self.model.validate()
    }

    /// Load from a JSON file; missing keys take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CreditError::InputNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
