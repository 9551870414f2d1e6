//! Column-wise preprocessing applied before the regressor
//!
//! Each input feature maps to exactly one [`ColumnTransform`]. The encoded
//! vector is the concatenation of every column's output, so a one-hot column
//! with five categories contributes five slots.

use serde::{Deserialize, Serialize};

use crate::contracts::{FeatureValue, FEATURE_NAMES};
use crate::error::InferenceError;

/// What to do with a category the encoder was not fitted on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Encode as all zeros
    #[default]
    Ignore,
    /// Fail the prediction
    Error,
}

/// Transform for a single feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTransform {
    /// Numeric value copied as is
    Passthrough,
    /// `(x - mean) / scale`
    Standard { mean: f64, scale: f64 },
    /// One slot per known category
    OneHot {
        categories: Vec<String>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
}

impl ColumnTransform {
    /// Number of encoded slots this column produces
    pub fn width(&self) -> usize {
        match self {
            ColumnTransform::Passthrough | ColumnTransform::Standard { .. } => 1,
            ColumnTransform::OneHot { categories, .. } => categories.len(),
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, ColumnTransform::OneHot { .. })
    }

    fn validate(&self, feature: &str) -> Result<(), String> {
        match self {
            ColumnTransform::Passthrough => Ok(()),
            ColumnTransform::Standard { mean, scale } => {
                if !mean.is_finite() || !scale.is_finite() || *scale == 0.0 {
                    return Err(format!(
                        "column '{}' has an unusable standard scaler (mean {}, scale {})",
                        feature, mean, scale
                    ));
                }
                Ok(())
            }
            ColumnTransform::OneHot { categories, .. } => {
                if categories.is_empty() {
                    return Err(format!("column '{}' has no categories", feature));
                }
                for (i, category) in categories.iter().enumerate() {
                    if categories[..i].contains(category) {
                        return Err(format!(
                            "column '{}' lists category '{}' twice",
                            feature, category
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    fn encode(
        &self,
        feature: &str,
        value: &FeatureValue,
        out: &mut Vec<f64>,
    ) -> Result<(), InferenceError> {
        match self {
            ColumnTransform::Passthrough => {
                out.push(number(feature, value)?);
            }
            ColumnTransform::Standard { mean, scale } => {
                out.push((number(feature, value)? - mean) / scale);
            }
            ColumnTransform::OneHot {
                categories,
                handle_unknown,
            } => {
                let category = value.as_category().ok_or_else(|| InferenceError::TypeMismatch {
                    feature: feature.to_string(),
                    expected: "a category string",
                })?;
                let position = categories.iter().position(|c| c == category);
                if position.is_none() && *handle_unknown == HandleUnknown::Error {
                    return Err(InferenceError::UnknownCategory {
                        feature: feature.to_string(),
                        value: category.to_string(),
                    });
                }
                out.extend((0..categories.len()).map(|i| {
                    if Some(i) == position {
                        1.0
                    } else {
                        0.0
                    }
                }));
            }
        }
        Ok(())
    }
}

fn number(feature: &str, value: &FeatureValue) -> Result<f64, InferenceError> {
    value.as_number().ok_or_else(|| InferenceError::TypeMismatch {
        feature: feature.to_string(),
        expected: "a number",
    })
}

/// Ordered set of column transforms, one per feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub columns: Vec<ColumnTransform>,
}

impl Preprocessor {
    /// Total width of the encoded vector
    pub fn encoded_width(&self) -> usize {
        self.columns.iter().map(ColumnTransform::width).sum()
    }

    /// Structural checks run once at load time
    pub fn validate(&self, categorical: &[&str]) -> Result<(), String> {
        if self.columns.len() != FEATURE_NAMES.len() {
            return Err(format!(
                "preprocessor has {} columns, expected {}",
                self.columns.len(),
                FEATURE_NAMES.len()
            ));
        }

        for (name, column) in FEATURE_NAMES.iter().zip(&self.columns) {
            column.validate(name)?;
            let expects_category = categorical.contains(name);
            if column.is_categorical() != expects_category {
                return Err(format!(
                    "column '{}' must use a {} transform",
                    name,
                    if expects_category { "categorical" } else { "numeric" }
                ));
            }
        }

        Ok(())
    }

    /// Encode an ordered feature vector into model input
    pub fn transform(&self, features: &[FeatureValue]) -> Result<Vec<f64>, InferenceError> {
        if features.len() != self.columns.len() {
            return Err(InferenceError::InputShape {
                expected: self.columns.len(),
                actual: features.len(),
            });
        }

        let mut encoded = Vec::with_capacity(self.encoded_width());
        for ((name, column), value) in FEATURE_NAMES.iter().zip(&self.columns).zip(features) {
            column.encode(name, value, &mut encoded)?;
        }
        Ok(encoded)
    }
}
