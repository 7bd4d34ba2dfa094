//! L2-regularized logistic regression

use crate::error::{CreditError, Result};
use super::config::{ClassWeight, ModelConfig, Solver};
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of correction pairs kept by L-BFGS
const LBFGS_HISTORY: usize = 10;
/// Sufficient-decrease constant for the Armijo condition
const ARMIJO_C1: f64 = 1e-4;
/// Step halvings tried before the line search gives up
const MAX_LINE_SEARCH: usize = 40;

/// Outcome of a fit call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Optimizer iterations performed
    pub n_iter: usize,
    /// Whether the gradient tolerance was reached within `max_iter`
    pub converged: bool,
    /// Regularized objective at the returned parameters
    pub final_loss: f64,
    /// Max-abs gradient at the returned parameters
    pub gradient_norm: f64,
}

/// Binary logistic regression fitted by maximum likelihood.
///
/// Minimises `(1/Σs) Σ s_i·logloss_i + ‖w‖² / (2·C·Σs)` where `s` are the sample
/// weights. The intercept is not penalised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    config: ModelConfig,
    report: Option<FitReport>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression with default hyper-parameters
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    /// Create a new logistic regression from a config
    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            config,
            report: None,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter;
        self
    }

    /// Set the optimizer
    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.config.solver = solver;
        self
    }

    /// Set class weighting
    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.config.class_weight = class_weight;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Report from the last fit
    pub fn fit_report(&self) -> Option<&FitReport> {
        self.report.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Fit on a feature matrix and 0/1 labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        self.config.validate()?;

        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(CreditError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(CreditError::TrainingError(
                "labels must be 0 or 1".to_string(),
            ));
        }

        let n_pos = y.iter().filter(|&&v| v == 1.0).count();
        if n_pos == 0 || n_pos == n_samples {
            return Err(CreditError::TrainingError(
                "training labels contain a single class".to_string(),
            ));
        }

        let weights = self.sample_weights(y, n_pos);
        let objective = Objective::new(x, y, &weights, self.config.c);

        let (params, report) = match self.config.solver {
            Solver::Lbfgs => self.minimize_lbfgs(&objective),
            Solver::GradientDescent => self.minimize_gradient_descent(&objective),
        };

        if report.converged {
            tracing::debug!(
                solver = %self.config.solver,
                iterations = report.n_iter,
                loss = report.final_loss,
                "logistic regression converged"
            );
        } else {
            tracing::warn!(
                solver = %self.config.solver,
                iterations = report.n_iter,
                gradient = report.gradient_norm,
                tol = self.config.tol,
                "logistic regression did not converge; using best parameters found"
            );
        }

        let d = x.ncols();
        self.coefficients = Some(params.slice(s![..d]).to_owned());
        self.intercept = Some(params[d]);
        self.report = Some(report);
        Ok(self)
    }

    /// Predict probabilities of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(CreditError::ModelNotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(CreditError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let intercept = self.intercept.unwrap_or(0.0);
        let linear = x.dot(coefficients) + intercept;
        Ok(linear.mapv(sigmoid))
    }

    /// Predict class labels: 1 where probability >= threshold
    pub fn predict(&self, x: &Array2<f64>, threshold: f64) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= threshold { 1.0 } else { 0.0 }))
    }

    fn sample_weights(&self, y: &Array1<f64>, n_pos: usize) -> Array1<f64> {
        match self.config.class_weight {
            ClassWeight::Uniform => Array1::ones(y.len()),
            ClassWeight::Balanced => {
                let n = y.len() as f64;
                let w_pos = n / (2.0 * n_pos as f64);
                let w_neg = n / (2.0 * (y.len() - n_pos) as f64);
                y.mapv(|v| if v == 1.0 { w_pos } else { w_neg })
            }
        }
    }

    fn minimize_lbfgs(&self, objective: &Objective<'_>) -> (Array1<f64>, FitReport) {
        let mut params = Array1::zeros(objective.dim());
        let (mut loss, mut grad) = objective.evaluate(&params);
        let mut history: VecDeque<(Array1<f64>, Array1<f64>, f64)> = VecDeque::new();
        let mut n_iter = 0;

        while n_iter < self.config.max_iter && max_abs(&grad) > self.config.tol {
            let mut direction = two_loop_direction(&grad, &history);
            let mut slope = grad.dot(&direction);
            if !(slope < 0.0) {
                history.clear();
                direction = -&grad;
                slope = -grad.dot(&grad);
            }

            // First step has no curvature information; keep it modest.
            let mut step = if history.is_empty() {
                1.0 / max_abs(&grad).max(1.0)
            } else {
                1.0
            };

            let mut accepted = None;
            for _ in 0..MAX_LINE_SEARCH {
                let candidate = &params + &(&direction * step);
                let (c_loss, c_grad) = objective.evaluate(&candidate);
                if c_loss.is_finite() && c_loss <= loss + ARMIJO_C1 * step * slope {
                    accepted = Some((candidate, c_loss, c_grad));
                    break;
                }
                step *= 0.5;
            }

            let Some((next, next_loss, next_grad)) = accepted else {
                tracing::debug!(iteration = n_iter, "line search failed to find a decrease");
                break;
            };

            let s_k = &next - &params;
            let y_k = &next_grad - &grad;
            let sy = s_k.dot(&y_k);
            if sy > 1e-10 {
                if history.len() == LBFGS_HISTORY {
                    history.pop_front();
                }
                history.push_back((s_k, y_k, 1.0 / sy));
            }

            params = next;
            loss = next_loss;
            grad = next_grad;
            n_iter += 1;
        }

        let gradient_norm = max_abs(&grad);
        let report = FitReport {
            n_iter,
            converged: gradient_norm <= self.config.tol,
            final_loss: loss,
            gradient_norm,
        };
        (params, report)
    }

    fn minimize_gradient_descent(&self, objective: &Objective<'_>) -> (Array1<f64>, FitReport) {
        let lr = self.config.learning_rate;
        let mut params = Array1::zeros(objective.dim());
        let (mut loss, mut grad) = objective.evaluate(&params);
        let mut best = (params.clone(), loss, grad.clone());
        let mut n_iter = 0;

        while n_iter < self.config.max_iter && max_abs(&grad) > self.config.tol {
            params = &params - &(&grad * lr);
            let (next_loss, next_grad) = objective.evaluate(&params);
            loss = next_loss;
            grad = next_grad;
            n_iter += 1;

            if loss < best.1 {
                best = (params.clone(), loss, grad.clone());
            }
        }

        let (params, final_loss, grad) = best;
        let gradient_norm = max_abs(&grad);
        let report = FitReport {
            n_iter,
            converged: gradient_norm <= self.config.tol,
            final_loss,
            gradient_norm,
        };
        (params, report)
    }
}

/// Weighted, L2-penalised logistic loss over a fixed design matrix.
/// Parameters are laid out as `[w_0, .., w_{d-1}, b]`.
struct Objective<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
    weights: &'a Array1<f64>,
    total_weight: f64,
    l2: f64,
}

impl<'a> Objective<'a> {
    fn new(x: &'a Array2<f64>, y: &'a Array1<f64>, weights: &'a Array1<f64>, c: f64) -> Self {
        Self {
            x,
            y,
            weights,
            total_weight: weights.sum(),
            l2: 1.0 / c,
        }
    }

    fn dim(&self) -> usize {
        self.x.ncols() + 1
    }

    fn evaluate(&self, params: &Array1<f64>) -> (f64, Array1<f64>) {
        let d = self.x.ncols();
        let w = params.slice(s![..d]);
        let b = params[d];
        let z = self.x.dot(&w) + b;

        let mut loss = 0.0;
        let mut residual = Array1::zeros(z.len());
        for i in 0..z.len() {
            let zi = z[i];
            let si = self.weights[i];
            loss += si * (softplus(zi) - self.y[i] * zi);
            residual[i] = si * (sigmoid(zi) - self.y[i]);
        }

        let norm = self.total_weight;
        loss = loss / norm + 0.5 * self.l2 * w.dot(&w) / norm;

        let mut grad = Array1::zeros(d + 1);
        let grad_w = self.x.t().dot(&residual) / norm + &w * (self.l2 / norm);
        grad.slice_mut(s![..d]).assign(&grad_w);
        grad[d] = residual.sum() / norm;
        (loss, grad)
    }
}

/// L-BFGS two-loop recursion; returns the descent direction `-H·g`.
fn two_loop_direction(
    grad: &Array1<f64>,
    history: &VecDeque<(Array1<f64>, Array1<f64>, f64)>,
) -> Array1<f64> {
    let mut q = grad.clone();
    let mut alphas = Vec::with_capacity(history.len());
    for (s_k, y_k, rho) in history.iter().rev() {
        let alpha = rho * s_k.dot(&q);
        q.scaled_add(-alpha, y_k);
        alphas.push(alpha);
    }

    let gamma = match history.back() {
        Some((s_k, y_k, _)) => s_k.dot(y_k) / y_k.dot(y_k),
        None => 1.0,
    };
    let mut r = q * gamma;

    for ((s_k, y_k, rho), alpha) in history.iter().zip(alphas.iter().rev()) {
        let beta = rho * y_k.dot(&r);
        r.scaled_add(alpha - beta, s_k);
    }
    -r
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}
