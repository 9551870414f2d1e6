//! House Price Prediction API
//!
//! Serves a pre-trained house price regression model over HTTP. A request
//! body of twelve housing features is validated, ordered into the feature
//! vector the model was trained on, and turned into a single price estimate.
//!
//! ## Architecture
//!
//! 1. **Contracts** (`contracts/`): input record, output record and the fixed
//!    feature order.
//!
//! 2. **Validation** (`validation`): range and type checks producing every
//!    violation at once, independent of the web framework.
//!
//! 3. **Model** (`model/`): artifact loading, preprocessing and regressors
//!    behind the [`model::PriceModel`] trait.
//!
//! 4. **Handler** (`handler/`): axum routes, middleware and error mapping.
//!
//! 5. **Telemetry** (`telemetry/`): tracing setup and Prometheus metrics.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use house_price_api::{create_router, AppState, LoadedModel};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let model = LoadedModel::load("models/house_price_model.json")?;
//!     let state = AppState::new(Arc::new(model))?;
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, create_router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod telemetry;
pub mod validation;

// Contracts module - located at ../contracts relative to src/
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use config::{LogFormat, ServiceConfig};
pub use contracts::{FeatureValue, HouseFeatures, PredictionResult, FEATURE_COUNT, FEATURE_NAMES};
pub use error::{
    InferenceError, ModelLoadError, PredictionError, ValidationErrors, Violation, ViolationCode,
};
pub use handler::{create_router, ApiError, AppState, API_NAME, API_VERSION};
pub use model::{predict_price, LoadedModel, PriceModel};
pub use validation::validate_payload;

/// Validate a raw JSON record and predict its price in one call
pub fn predict_from_json(
    model: &dyn PriceModel,
    payload: &serde_json::Value,
) -> error::Result<PredictionResult> {
    let features = validate_payload(payload)?;
    Ok(predict_price(model, &features)?)
}
