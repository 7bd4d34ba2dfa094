//! Credit approval - end-to-end tabular classification workflow
//!
//! This crate generates (or loads) credit applications, explores them, and trains
//! a logistic-regression approval model behind a preprocessing pipeline:
//! - Synthetic data generation with controlled missingness
//! - EDA summaries and figures
//! - Imputation, scaling and one-hot encoding fitted on the training partition
//! - Stratified splitting, L2-regularized logistic regression, odds-ratio export
//! - Metrics, ROC curve and threshold sweep
//!
//! # Modules
//!
//! ## Core
//! - [`preprocessing`] - Column schema, imputation, scaling, encoding
//! - [`training`] - Stratified split, logistic regression, approval model
//! - [`evaluation`] - Metrics, confusion matrix, ROC, threshold sweep
//!
//! ## Data
//! - [`synthetic`] - Synthetic credit-application generator
//! - [`eda`] - Exploratory summaries
//! - [`utils`] - CSV loading/saving and statistics helpers
//!
//! ## Output
//! - [`visualization`] - SVG charts
//! - [`artifacts`] - Artifact sinks (directory, in-memory)
//!
//! ## Orchestration
//! - [`config`] - Run configuration
//! - [`runner`] - Full workflow
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod evaluation;

// Data
pub mod synthetic;
pub mod eda;
pub mod utils;

// Output
pub mod visualization;
pub mod artifacts;

// Orchestration
pub mod config;
pub mod runner;
pub mod cli;

pub use error::{CreditError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{CreditError, Result};

    // Configuration
    pub use crate::config::{DataSource, OutputLayout, PipelineConfig};

    // Preprocessing
    pub use crate::preprocessing::{ColumnKind, ColumnTransformer, PreprocessingConfig, UnknownCategoryPolicy};

    // Training
    pub use crate::training::{
        ApprovalModel, ClassWeight, LogisticRegression, ModelConfig, Solver, StratifiedSplitter,
    };

    // Evaluation
    pub use crate::evaluation::{ClassificationMetrics, ConfusionMatrix, EvaluationReport, Evaluator};

    // Data
    pub use crate::eda::EdaReport;
    pub use crate::synthetic::CreditDataGenerator;
    pub use crate::utils::{DataLoader, DataSaver};

    // Output and orchestration
    pub use crate::artifacts::{ArtifactSink, DirectorySink, MemorySink};
    pub use crate::runner::{PipelineRunner, RunSummary};
}
