//! Error types for the House Price Prediction API
//!
//! Request-time failures fall into two kinds: [`ValidationErrors`] (the
//! client sent something malformed or out of range) and [`InferenceError`]
//! (the model call failed). [`ModelLoadError`] only occurs at startup and is
//! fatal.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable reason a single field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    /// Required field absent from the body
    MissingField,
    /// Field present but of the wrong JSON type
    TypeMismatch,
    /// Numeric field outside its allowed range
    OutOfRange,
    /// Numeric field is NaN or infinite
    NotFinite,
    /// Category string is empty or whitespace
    EmptyCategory,
    /// Body is not a JSON object or could not be parsed at all
    InvalidBody,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::MissingField => "MISSING_FIELD",
            ViolationCode::TypeMismatch => "TYPE_MISMATCH",
            ViolationCode::OutOfRange => "OUT_OF_RANGE",
            ViolationCode::NotFinite => "NOT_FINITE",
            ViolationCode::EmptyCategory => "EMPTY_CATEGORY",
            ViolationCode::InvalidBody => "INVALID_BODY",
        }
    }
}

/// A single violated input constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Field name, or `"body"` for whole-payload problems
    pub field: String,
    pub code: ViolationCode,
    /// Human-readable explanation
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::new(
            field,
            ViolationCode::MissingField,
            format!("field '{}' is required", field),
        )
    }

    pub fn type_mismatch(field: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            field,
            ViolationCode::TypeMismatch,
            format!("field '{}' must be a {}, got {}", field, expected, actual),
        )
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::new("body", ViolationCode::InvalidBody, message)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every constraint a request violated, in feature order
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn single(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether any violation concerns the named field
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.violations.iter().map(|v| v.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Failure inside feature-vector encoding or the model call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Expected {expected} features, got {actual}")]
    InputShape { expected: usize, actual: usize },

    #[error("Feature '{feature}' must be {expected}")]
    TypeMismatch {
        feature: String,
        expected: &'static str,
    },

    #[error("Unknown category '{value}' for feature '{feature}'")]
    UnknownCategory { feature: String, value: String },

    #[error("Model produced a non-finite output: {0}")]
    NonFiniteOutput(f64),

    #[error("Model produced a non-positive price: {0}")]
    NonPositivePrice(f64),

    #[error("Model evaluation failed: {0}")]
    Model(String),
}

impl InferenceError {
    pub fn model(msg: impl Into<String>) -> Self {
        InferenceError::Model(msg.into())
    }
}

/// Startup failure while loading the model artifact
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Model file not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read model file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

impl ModelLoadError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ModelLoadError::Invalid(msg.into())
    }
}

/// Either failure a single prediction can end in
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Prediction failed: {0}")]
    Inference(#[from] InferenceError),
}

impl PredictionError {
    /// Check if this is a client error (vs a server-side failure)
    pub fn is_user_error(&self) -> bool {
        matches!(self, PredictionError::Validation(_))
    }
}

/// Result type alias for prediction operations
pub type Result<T> = std::result::Result<T, PredictionError>;
