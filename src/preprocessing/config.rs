//! Preprocessing configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What to do with a categorical value that was not seen during fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Emit an all-zero indicator block and log a warning
    #[default]
    Ignore,
    /// Fail the transform with `CreditError::UnknownCategory`
    Error,
}

impl FromStr for UnknownCategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown category policy '{}', expected ignore or error", other)),
        }
    }
}

/// Configuration for data preprocessing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Handling of categories outside the fitted vocabulary
    pub unknown_categories: UnknownCategoryPolicy,

    /// Relative tolerance: a std at or below `tol * max(|mean|, 1)` counts as zero
    /// and the scale falls back to 1.0
    pub zero_variance_tol: f64,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            unknown_categories: UnknownCategoryPolicy::Ignore,
            zero_variance_tol: 10.0 * f64::EPSILON,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the unknown-category policy
    pub fn with_unknown_categories(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_categories = policy;
        self
    }

    /// Builder method to set the zero-variance tolerance
    pub fn with_zero_variance_tol(mut self, tol: f64) -> Self {
        self.zero_variance_tol = tol;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreprocessingConfig::default();
        assert_eq!(config.unknown_categories, UnknownCategoryPolicy::Ignore);
        assert!(config.zero_variance_tol > 0.0);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PreprocessingConfig::new()
            .with_unknown_categories(UnknownCategoryPolicy::Error)
            .with_zero_variance_tol(1e-9);

        assert_eq!(config.unknown_categories, UnknownCategoryPolicy::Error);
        assert_eq!(config.zero_variance_tol, 1e-9);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("IGNORE".parse::<UnknownCategoryPolicy>().unwrap(), UnknownCategoryPolicy::Ignore);
        assert_eq!("error".parse::<UnknownCategoryPolicy>().unwrap(), UnknownCategoryPolicy::Error);
        assert!("drop".parse::<UnknownCategoryPolicy>().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PreprocessingConfig = serde_json::from_str(r#"{ "unknown_categories": "error" }"#).unwrap();
        assert_eq!(config.unknown_categories, UnknownCategoryPolicy::Error);
        assert_eq!(config.zero_variance_tol, PreprocessingConfig::default().zero_variance_tol);
    }
}
