//! Inference adapter
//!
//! A model is loaded once at process start and shared read-only behind
//! `Arc<dyn PriceModel>`. The HTTP layer never sees the artifact format;
//! it only hands an ordered feature vector to [`PriceModel::predict`].
//!
//! - `artifact`: on-disk JSON document and loading
//! - `pipeline`: per-column preprocessing (scaling, one-hot encoding)
//! - `regressor`: linear and tree-ensemble regressors

pub mod artifact;
pub mod pipeline;
pub mod regressor;

pub use artifact::{load_artifact, ModelArtifact, ModelSummary, DEFAULT_MODEL_PATH};
pub use pipeline::{ColumnTransform, HandleUnknown, Preprocessor};
pub use regressor::{ForestRegressor, LinearRegressor, RegressionTree, Regressor, TreeNode};

use std::path::Path;

use crate::contracts::{FeatureValue, HouseFeatures, PredictionResult, FEATURE_COUNT};
use crate::error::{InferenceError, ModelLoadError};

/// Anything that maps an ordered feature vector to a price
///
/// Implementations must be pure with respect to their inputs: the same
/// vector always yields the same output and no shared state is mutated.
pub trait PriceModel: Send + Sync {
    /// Predict from exactly [`FEATURE_COUNT`] values in `FEATURE_NAMES` order
    fn predict(&self, features: &[FeatureValue]) -> Result<f64, InferenceError>;

    /// Human-readable model identifier
    fn name(&self) -> &str;
}

/// Model backed by a validated [`ModelArtifact`]
#[derive(Debug, Clone)]
pub struct LoadedModel {
    artifact: ModelArtifact,
    summary: ModelSummary,
}

impl LoadedModel {
    /// Load and validate the artifact at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let (artifact, sha256) = load_artifact(path)?;
        let summary = artifact.summary(sha256);

        tracing::info!(
            path = %path.display(),
            model = %summary.name,
            version = %summary.version,
            regressor = %summary.regressor,
            sha256 = %summary.sha256,
            "Model artifact loaded"
        );

        Ok(Self { artifact, summary })
    }

    /// Wrap an in-memory artifact, running the same checks as [`LoadedModel::load`]
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelLoadError> {
        artifact.validate()?;
        let summary = artifact.summary("in-memory");
        Ok(Self { artifact, summary })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }
}

impl PriceModel for LoadedModel {
    fn predict(&self, features: &[FeatureValue]) -> Result<f64, InferenceError> {
        if features.len() != FEATURE_COUNT {
            return Err(InferenceError::InputShape {
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }

        let encoded = self.artifact.preprocessor.transform(features)?;
        let output = self.artifact.regressor.predict(&encoded)?;
        if !output.is_finite() {
            return Err(InferenceError::NonFiniteOutput(output));
        }
        Ok(output)
    }

    fn name(&self) -> &str {
        &self.summary.name
    }
}

/// Order the features, run the model and wrap the price
pub fn predict_price(
    model: &dyn PriceModel,
    features: &HouseFeatures,
) -> Result<PredictionResult, InferenceError> {
    let vector = features.to_feature_vector();
    let price = model.predict(&vector)?;
    PredictionResult::new(price)
}
