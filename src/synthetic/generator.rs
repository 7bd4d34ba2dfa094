//! Seeded credit-application generator

use super::{EMPLOYMENT, HOME_OWNERSHIP, PURPOSE, REGION};
use crate::error::{CreditError, Result};
use crate::training::sigmoid;
use polars::prelude::*;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Normal, Poisson};
use serde::{Deserialize, Serialize};

const EMPLOYMENT_WEIGHTS: [f64; 4] = [0.58, 0.18, 0.18, 0.06];
const HOME_OWNERSHIP_WEIGHTS: [f64; 4] = [0.25, 0.35, 0.36, 0.04];
const REGION_WEIGHTS: [f64; 4] = [0.5, 0.2, 0.2, 0.1];

/// Fraction of rows blanked out in `income` and, independently, in `employment`
const MISSING_RATE: f64 = 0.03;

/// Generates a reproducible synthetic credit-approval dataset.
///
/// The label is a thresholded logistic of a latent score that rises with income,
/// credit score and age, falls with debt load, and gets small categorical bonuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditDataGenerator {
    rows: usize,
    seed: u64,
}

impl CreditDataGenerator {
    pub fn new(rows: usize) -> Self {
        Self { rows, seed: 42 }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generate(&self) -> Result<DataFrame> {
        let n = self.rows;
        if n == 0 {
            return Err(CreditError::InvalidParameter {
                name: "rows".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        // Each column is drawn in full before the next so the stream order is fixed.
        let income = draw_normal(&mut rng, n, 65_000.0, 18_000.0)?
            .into_iter()
            .map(|v| v.max(15_000.0))
            .collect::<Vec<_>>();
        let credit_score = draw_normal(&mut rng, n, 690.0, 70.0)?
            .into_iter()
            .map(|v| v.clamp(300.0, 850.0))
            .collect::<Vec<_>>();
        let debt_to_income = draw_normal(&mut rng, n, 0.32, 0.12)?
            .into_iter()
            .map(|v| v.abs().clamp(0.01, 0.95))
            .collect::<Vec<_>>();
        let age = draw_normal(&mut rng, n, 38.0, 10.0)?
            .into_iter()
            .map(|v| v.clamp(18.0, 85.0))
            .collect::<Vec<_>>();

        let poisson = Poisson::new(0.8).map_err(|e| CreditError::ComputationError(e.to_string()))?;
        let existing_loans: Vec<i64> = (0..n).map(|_| poisson.sample(&mut rng) as i64).collect();

        let employment = draw_weighted(&mut rng, n, &EMPLOYMENT, &EMPLOYMENT_WEIGHTS)?;
        let home_ownership = draw_weighted(&mut rng, n, &HOME_OWNERSHIP, &HOME_OWNERSHIP_WEIGHTS)?;
        let purpose: Vec<&'static str> = (0..n).map(|_| PURPOSE[rng.gen_range(0..PURPOSE.len())]).collect();
        let region = draw_weighted(&mut rng, n, &REGION, &REGION_WEIGHTS)?;
        let noise = draw_normal(&mut rng, n, 0.0, 0.4)?;

        let approved: Vec<i64> = (0..n)
            .map(|i| {
                let lin = 3e-5 * income[i] + 0.01 * (credit_score[i] - 650.0) - 1.8 * debt_to_income[i]
                    - 0.12 * existing_loans[i] as f64
                    + 0.02 * (age[i] - 35.0);
                let bonus = category_bonus(employment[i], home_ownership[i], purpose[i], region[i]);
                i64::from(sigmoid(lin + bonus + noise[i]) > 0.5)
            })
            .collect();

        let income_mask = draw_mask(&mut rng, n);
        let employment_mask = draw_mask(&mut rng, n);

        let income: Vec<Option<f64>> = income
            .iter()
            .zip(&income_mask)
            .map(|(&v, &blank)| (!blank).then(|| round_to(v, 2)))
            .collect();
        let employment: Vec<Option<&str>> = employment
            .iter()
            .zip(&employment_mask)
            .map(|(&v, &blank)| (!blank).then_some(v))
            .collect();

        let df = DataFrame::new(vec![
            Column::new("income".into(), income),
            Column::new("credit_score".into(), credit_score.iter().map(|&v| round_to(v, 0)).collect::<Vec<f64>>()),
            Column::new("debt_to_income".into(), debt_to_income.iter().map(|&v| round_to(v, 3)).collect::<Vec<f64>>()),
            Column::new("age".into(), age.iter().map(|&v| round_to(v, 0)).collect::<Vec<f64>>()),
            Column::new("existing_loans".into(), existing_loans),
            Column::new("employment".into(), employment),
            Column::new("home_ownership".into(), home_ownership),
            Column::new("purpose".into(), purpose),
            Column::new("region".into(), region),
            Column::new("approved".into(), approved),
        ])?;

        tracing::debug!(rows = n, seed = self.seed, "generated synthetic credit data");
        Ok(df)
    }
}

fn draw_normal(rng: &mut ChaCha8Rng, n: usize, mean: f64, std: f64) -> Result<Vec<f64>> {
    let dist = Normal::new(mean, std).map_err(|e| CreditError::ComputationError(e.to_string()))?;
    Ok((0..n).map(|_| dist.sample(rng)).collect())
}

fn draw_weighted(
    rng: &mut ChaCha8Rng,
    n: usize,
    choices: &[&'static str],
    weights: &[f64],
) -> Result<Vec<&'static str>> {
    let dist = WeightedIndex::new(weights).map_err(|e| CreditError::ComputationError(e.to_string()))?;
    Ok((0..n).map(|_| choices[dist.sample(rng)]).collect())
}

fn draw_mask(rng: &mut ChaCha8Rng, n: usize) -> Vec<bool> {
    (0..n).map(|_| rng.gen::<f64>() < MISSING_RATE).collect()
}

fn category_bonus(employment: &str, home_ownership: &str, purpose: &str, region: &str) -> f64 {
    let mut bonus = 0.0;
    if employment == "full_time" {
        bonus += 0.35;
    }
    if home_ownership == "own" {
        bonus += 0.25;
    }
    match purpose {
        "debt_consolidation" => bonus -= 0.15,
        "home_improvement" => bonus += 0.1,
        _ => {}
    }
    if region == "NA" {
        bonus += 0.05;
    }
    bonus
}

/// Round half to even, matching how the values are usually printed by numeric tooling
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
