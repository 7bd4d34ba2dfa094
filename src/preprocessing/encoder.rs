//! One-hot categorical encoding

use crate::error::{CreditError, Result};
use super::config::UnknownCategoryPolicy;
use ndarray::ArrayViewMut2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Vocabulary of one fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Vocabulary {
    column: String,
    categories: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Vocabulary {
    fn new(column: &str, categories: Vec<String>) -> Self {
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            column: column.to_string(),
            categories,
            index,
        }
    }

    fn position(&self, value: &str) -> Option<usize> {
        if self.index.is_empty() {
            self.categories.iter().position(|c| c == value)
        } else {
            self.index.get(value).copied()
        }
    }
}

/// One-hot encoder with vocabularies frozen at fit time.
///
/// Columns keep the order they were fitted in; categories within a column are
/// sorted lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    vocabularies: Vec<Vocabulary>,
    handle_unknown: UnknownCategoryPolicy,
}

impl OneHotEncoder {
    /// Create a new encoder
    pub fn new(handle_unknown: UnknownCategoryPolicy) -> Self {
        Self {
            vocabularies: Vec::new(),
            handle_unknown,
        }
    }

    /// Fit one column from its imputed values
    pub fn fit_column(&mut self, column: &str, values: &[String]) -> Result<&mut Self> {
        if self.vocabularies.iter().any(|v| v.column == column) {
            return Err(CreditError::PreprocessingError(format!(
                "column '{}' already has a vocabulary",
                column
            )));
        }

        let categories: Vec<String> = values
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if categories.is_empty() {
            return Err(CreditError::PreprocessingError(format!(
                "column '{}' has no categories to encode",
                column
            )));
        }

        self.vocabularies.push(Vocabulary::new(column, categories));
        Ok(self)
    }

    /// Categories of a fitted column, in output order
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.vocabulary(column).map(|v| v.categories.as_slice())
    }

    /// Number of indicator columns produced for `column`
    pub fn width(&self, column: &str) -> Result<usize> {
        self.vocabulary(column)
            .map(|v| v.categories.len())
            .ok_or(CreditError::ModelNotFitted)
    }

    /// Indicator names as `{column}_{category}` for every fitted column
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flat_map(|v| v.categories.iter().map(move |c| format!("{}_{}", v.column, c)))
            .collect()
    }

    /// Write indicators for `values` into `out` (shape `values.len() x width`).
    ///
    /// Returns how many rows held a category outside the vocabulary; those rows stay
    /// all-zero unless the policy is `Error`.
    pub fn encode_into(
        &self,
        column: &str,
        values: &[String],
        mut out: ArrayViewMut2<'_, f64>,
    ) -> Result<usize> {
        let vocab = self.vocabulary(column).ok_or(CreditError::ModelNotFitted)?;
        if out.nrows() != values.len() || out.ncols() != vocab.categories.len() {
            return Err(CreditError::ShapeError {
                expected: format!("({}, {})", values.len(), vocab.categories.len()),
                actual: format!("({}, {})", out.nrows(), out.ncols()),
            });
        }

        let mut unknown = 0;
        for (row, value) in values.iter().enumerate() {
            match vocab.position(value) {
                Some(j) => out[[row, j]] = 1.0,
                None => {
                    if self.handle_unknown == UnknownCategoryPolicy::Error {
                        return Err(CreditError::UnknownCategory {
                            column: column.to_string(),
                            value: value.clone(),
                        });
                    }
                    unknown += 1;
                }
            }
        }
        Ok(unknown)
    }

    fn vocabulary(&self, column: &str) -> Option<&Vocabulary> {
        self.vocabularies.iter().find(|v| v.column == column)
    }
}
