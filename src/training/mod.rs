//! Model training module
//!
//! Provides:
//! - Stratified train/test splitting
//! - L2-regularized logistic regression (L-BFGS or gradient descent)
//! - The combined preprocessing + classifier model with odds-ratio export

mod config;
mod models;
pub mod linear_models;
pub mod split;

pub use config::{ClassWeight, ModelConfig, Solver};
pub use models::{odds_frame, ApprovalModel, CoefficientRow};
pub use linear_models::{sigmoid, FitReport, LogisticRegression};
pub use split::{extract_target, take_rows, SplitIndices, StratifiedSplitter, TrainTestSplit};
