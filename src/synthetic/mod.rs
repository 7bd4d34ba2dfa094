//! Synthetic data generation module
//!
//! Produces the credit-application dataset used when no CSV input is given:
//! five numeric drivers, four categorical attributes, an `approved` label and a
//! little injected missingness.

mod generator;

pub use generator::CreditDataGenerator;

/// Numeric columns, in output order
pub const NUMERIC_COLUMNS: [&str; 5] = ["income", "credit_score", "debt_to_income", "age", "existing_loans"];

/// Categorical columns, in output order
pub const CATEGORICAL_COLUMNS: [&str; 4] = ["employment", "home_ownership", "purpose", "region"];

/// Label column
pub const TARGET_COLUMN: &str = "approved";

pub const EMPLOYMENT: [&str; 4] = ["full_time", "part_time", "self_employed", "unemployed"];
pub const HOME_OWNERSHIP: [&str; 4] = ["own", "mortgage", "rent", "other"];
pub const PURPOSE: [&str; 7] = [
    "auto",
    "home_improvement",
    "debt_consolidation",
    "education",
    "medical",
    "business",
    "vacation",
];
pub const REGION: [&str; 4] = ["NA", "EU", "APAC", "LATAM"];
