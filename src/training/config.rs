//! Model configuration

use crate::error::{CreditError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Optimizer used to minimise the logistic loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solver {
    /// Limited-memory BFGS with backtracking line search
    #[default]
    Lbfgs,
    /// Full-batch gradient descent with a fixed learning rate
    GradientDescent,
}

impl FromStr for Solver {
    type Err = CreditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lbfgs" | "l-bfgs" => Ok(Solver::Lbfgs),
            "gd" | "gradient_descent" => Ok(Solver::GradientDescent),
            other => Err(CreditError::ConfigError(format!(
                "unsupported solver '{}', expected lbfgs or gd",
                other
            ))),
        }
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solver::Lbfgs => write!(f, "lbfgs"),
            Solver::GradientDescent => write!(f, "gradient_descent"),
        }
    }
}

/// Per-class sample weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample weighs 1
    #[default]
    Uniform,
    /// Each class weighted by `n_samples / (2 * n_class)`
    Balanced,
}

/// Hyper-parameters for the logistic regression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Inverse L2 regularization strength; smaller is stronger
    pub c: f64,
    pub solver: Solver,
    pub max_iter: usize,
    /// Convergence threshold on the max-abs gradient
    pub tol: f64,
    pub class_weight: ClassWeight,
    /// Step size for `Solver::GradientDescent`
    pub learning_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            solver: Solver::Lbfgs,
            max_iter: 200,
            tol: 1e-4,
            class_weight: ClassWeight::Uniform,
            learning_rate: 0.5,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(invalid("C", self.c, "must be a positive finite number"));
        }
        if self.max_iter == 0 {
            return Err(invalid("max_iter", self.max_iter, "must be at least 1"));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(invalid("tol", self.tol, "must be positive"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(invalid("learning_rate", self.learning_rate, "must be positive"));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl fmt::Display, reason: &str) -> CreditError {
    CreditError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.c, 1.0);
        assert_eq!(config.solver, Solver::Lbfgs);
        assert_eq!(config.max_iter, 200);
        assert_eq!(config.class_weight, ClassWeight::Uniform);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ModelConfig::new()
            .with_c(0.1)
            .with_solver(Solver::GradientDescent)
            .with_class_weight(ClassWeight::Balanced)
            .with_max_iter(50);

        assert_eq!(config.c, 0.1);
        assert_eq!(config.solver, Solver::GradientDescent);
        assert_eq!(config.class_weight, ClassWeight::Balanced);
        assert_eq!(config.max_iter, 50);
    }

    #[test]
    fn test_validate_rejects_bad_c() {
        let err = ModelConfig::new().with_c(0.0).validate().unwrap_err();
        assert!(matches!(err, CreditError::InvalidParameter { ref name, .. } if name == "C"));
        assert!(ModelConfig::new().with_c(f64::NAN).validate().is_err());
        assert!(ModelConfig::new().with_max_iter(0).validate().is_err());
    }

    #[test]
    fn test_solver_from_str() {
        assert_eq!("lbfgs".parse::<Solver>().unwrap(), Solver::Lbfgs);
        assert_eq!("GD".parse::<Solver>().unwrap(), Solver::GradientDescent);
        assert!(matches!("saga".parse::<Solver>(), Err(CreditError::ConfigError(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ModelConfig = serde_json::from_str(r#"{ "c": 0.5 }"#).unwrap();
        assert_eq!(config.c, 0.5);
        assert_eq!(config.solver, Solver::Lbfgs);
        assert_eq!(config.max_iter, 200);
        assert_eq!(config.learning_rate, 0.5);
    }
}
