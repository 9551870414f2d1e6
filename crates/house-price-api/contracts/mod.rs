//! Contracts for the House Price Prediction API
//!
//! Defines the input record accepted by `POST /predict`, the output record it
//! returns, and the fixed feature order the model was trained on.

pub mod features;

pub use features::{
    FeatureValue, HouseFeatures, PredictionResult, CATEGORICAL_FEATURES, FEATURE_COUNT,
    FEATURE_NAMES,
};
